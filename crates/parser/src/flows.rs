//! Flow metadata of a dataset's exchanges
//! (`GET /resource/processes/{id}/exchanges?view=overview`)

use bwilcd_core::Exchange;
use tracing::debug;

use crate::document::{Document, Element, Name};
use crate::error::ParseResult;
use crate::namespaces::{SERVICE_API, SERVICE_API_FLOW};

const FLOW: Name<'static> = Name::ns(SERVICE_API_FLOW, "flow");
const UUID: Name<'static> = Name::ns(SERVICE_API, "uuid");
const NAME: Name<'static> = Name::ns(SERVICE_API, "name");
const TYPE: Name<'static> = Name::ns(SERVICE_API_FLOW, "type");
const CATEGORY: Name<'static> = Name::ns(SERVICE_API, "category");
const DEFAULT_UNIT: Name<'static> = Name::ns(SERVICE_API_FLOW, "defaultUnit");

/// Only this classification depth is used as the category
const CATEGORY_LEVEL: &str = "2";

/// Parse the flow listing into flow-side exchange halves.
///
/// Direction and amount are left empty for enrichment to fill in. Flows
/// without a UUID cannot be joined and are skipped.
pub fn parse_flow_info(xml: &[u8]) -> ParseResult<Vec<Exchange>> {
    let document = Document::parse(xml)?;
    let flows: Vec<Exchange> = document.root().find_all(FLOW).filter_map(flow_from).collect();

    debug!(count = flows.len(), "parsed flow metadata");
    Ok(flows)
}

fn flow_from(flow: &Element) -> Option<Exchange> {
    let Some(identifier) = flow.child(UUID).and_then(Element::text) else {
        debug!("flow skipped: missing uuid");
        return None;
    };
    let child_text = |name: Name<'static>| flow.child(name).and_then(Element::text).unwrap_or_default();

    let category = flow
        .find_all(CATEGORY)
        .find(|c| c.attribute(Name::bare("level")) == Some(CATEGORY_LEVEL))
        .and_then(Element::text)
        .unwrap_or_default();
    let unit = flow
        .find(DEFAULT_UNIT)
        .and_then(Element::text)
        .unwrap_or_default();

    Some(Exchange::flow_metadata(
        identifier,
        child_text(NAME),
        child_text(TYPE),
        category,
        unit,
    ))
}
