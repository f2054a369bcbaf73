//! Process dataset overview (`GET /resource/processes/{id}?view=overview`)

use bwilcd_core::{DatasetDetail, Exchange, InternalId};
use tracing::debug;

use crate::document::{Document, Element, Name};
use crate::error::ParseResult;
use crate::namespaces::{ILCD_COMMON, ILCD_PROCESS, XML};

/// Only German text is read from multilingual fields
const LANGUAGE: &str = "de";

const fn p(local: &'static str) -> Name<'static> {
    Name::ns(ILCD_PROCESS, local)
}

const fn common(local: &'static str) -> Name<'static> {
    Name::ns(ILCD_COMMON, local)
}

const REFERENCE_FLOW: [Name<'static>; 2] = [p("quantitativeReference"), p("referenceToReferenceFlow")];
const BASE_NAME: [Name<'static>; 4] = [
    p("processInformation"),
    p("dataSetInformation"),
    p("name"),
    p("baseName"),
];
const UUID: [Name<'static>; 3] = [p("processInformation"), p("dataSetInformation"), common("UUID")];
const GENERAL_COMMENT: [Name<'static>; 3] = [
    p("processInformation"),
    p("dataSetInformation"),
    common("generalComment"),
];
const REFERENCE_YEAR: [Name<'static>; 3] = [p("processInformation"), p("time"), common("referenceYear")];
const LOCATION: [Name<'static>; 3] = [
    p("processInformation"),
    p("geography"),
    p("locationOfOperationSupplyOrProduction"),
];
const TECHNOLOGY: [Name<'static>; 3] = [
    p("processInformation"),
    p("technology"),
    p("technologyDescriptionAndIncludedProcesses"),
];
const FUNCTIONAL_UNIT: [Name<'static>; 2] = [p("quantitativeReference"), p("functionalUnitOrOther")];
const EXCHANGES: [Name<'static>; 2] = [p("exchanges"), p("exchange")];
const FLOW_REFERENCE: [Name<'static>; 1] = [p("referenceToFlowDataSet")];
const SHORT_DESCRIPTION: [Name<'static>; 2] = [p("referenceToFlowDataSet"), common("shortDescription")];

/// Parse a process dataset overview.
///
/// The process schema is stable, so every field has exactly one location.
/// Exchanges come back unenriched: type, category and unit are empty.
pub fn parse_dataset(xml: &[u8]) -> ParseResult<DatasetDetail> {
    let document = Document::parse(xml)?;
    let root = document.root();

    let pointer = root.select_first(&REFERENCE_FLOW);
    let reference_flow_id = pointer.and_then(Element::text).and_then(|t| t.parse().ok());
    if pointer.is_some() && reference_flow_id.is_none() {
        debug!("referenceToReferenceFlow is not an integer");
    }

    let detail = DatasetDetail {
        name: localized_text(root, &BASE_NAME),
        identifier: text_at(root, &UUID),
        description: localized_text(root, &GENERAL_COMMENT),
        reference_year: text_at(root, &REFERENCE_YEAR),
        geography: root
            .select_first(&LOCATION)
            .and_then(|e| e.attribute(Name::bare("location")))
            .map(str::to_string),
        technology: localized_text(root, &TECHNOLOGY),
        functional_unit: localized_text(root, &FUNCTIONAL_UNIT),
        has_reference_flow: pointer.is_some(),
        reference_flow_id,
        exchanges: extract_exchanges(root, reference_flow_id),
    };

    debug!(
        identifier = ?detail.identifier,
        exchanges = detail.exchanges.len(),
        "parsed dataset"
    );
    Ok(detail)
}

/// Read the exchanges of a process dataset.
///
/// Exchanges lacking a flow short description, a direction or a numeric
/// amount are skipped. An exchange is the reference flow when its internal
/// ID equals a non-zero `reference`.
pub fn extract_exchanges(root: &Element, reference: Option<InternalId>) -> Vec<Exchange> {
    root.select(&EXCHANGES)
        .into_iter()
        .filter_map(|element| exchange_from(element, reference))
        .collect()
}

fn exchange_from(element: &Element, reference: Option<InternalId>) -> Option<Exchange> {
    let internal_id: Option<InternalId> = element
        .attribute(Name::bare("dataSetInternalID"))
        .and_then(|id| id.trim().parse().ok());

    let Some(flow_name) = element.select_first(&SHORT_DESCRIPTION).and_then(Element::text) else {
        debug!(?internal_id, "exchange skipped: missing flow short description");
        return None;
    };
    let Some(direction) = element.child(p("exchangeDirection")).and_then(Element::text) else {
        debug!(?internal_id, "exchange skipped: missing exchangeDirection");
        return None;
    };
    let Some(amount) = element
        .child(p("meanAmount"))
        .and_then(Element::text)
        .and_then(|a| a.parse::<f64>().ok())
    else {
        debug!(?internal_id, "exchange skipped: missing meanAmount");
        return None;
    };

    let flow_identifier = element
        .select_first(&FLOW_REFERENCE)
        .and_then(|e| e.attribute(Name::bare("refObjectId")))
        .unwrap_or_default();

    // A zero pointer never marks an exchange
    let is_reference = matches!(reference, Some(r) if r != 0 && internal_id == Some(r));

    Some(Exchange::new(flow_name, direction, amount, flow_identifier).with_reference_flow(is_reference))
}

fn text_at(root: &Element, path: &[Name<'_>]) -> Option<String> {
    root.select_first(path)
        .and_then(Element::text)
        .map(str::to_string)
}

/// Text of the first element on `path` tagged `xml:lang="de"`
fn localized_text(root: &Element, path: &[Name<'_>]) -> Option<String> {
    root.select(path)
        .into_iter()
        .find(|e| e.attribute(Name::ns(XML, "lang")) == Some(LANGUAGE))
        .and_then(Element::text)
        .map(str::to_string)
}
