//! Dataset search results (`GET /resource/datastocks/{id}/processes`)

use bwilcd_core::{DatasetSummary, SearchPage};
use tracing::debug;

use crate::document::{Document, Element, Name};
use crate::error::ParseResult;
use crate::fallback::{FieldPaths, first_non_empty};
use crate::namespaces::{SERVICE_API, SERVICE_API_PROCESS};

/// Element names of one search hit, in priority order: service-API shape,
/// process shape, then both without a namespace.
const PROCESS_ELEMENTS: [Name<'static>; 4] = [
    Name::ns(SERVICE_API, "processDataSet"),
    Name::ns(SERVICE_API_PROCESS, "process"),
    Name::bare("processDataSet"),
    Name::bare("process"),
];

const UUID_NAMES: [Name<'static>; 3] = [
    Name::ns(SERVICE_API, "uuid"),
    Name::ns(SERVICE_API_PROCESS, "uuid"),
    Name::bare("uuid"),
];
const UUID_PATHS: FieldPaths<'static> = FieldPaths::new(&UUID_NAMES);

const NAME_NAMES: [Name<'static>; 5] = [
    Name::ns(SERVICE_API, "baseName"),
    Name::ns(SERVICE_API, "name"),
    Name::ns(SERVICE_API_PROCESS, "name"),
    Name::bare("baseName"),
    Name::bare("name"),
];
const NAME_PATHS: FieldPaths<'static> = FieldPaths::new(&NAME_NAMES);

const LOCATION_NAMES: [Name<'static>; 3] = [
    Name::ns(SERVICE_API_PROCESS, "location"),
    Name::ns(SERVICE_API, "location"),
    Name::bare("location"),
];
const LOCATION_PATHS: FieldPaths<'static> = FieldPaths::new(&LOCATION_NAMES);

/// Parse one page of a dataset search.
///
/// Hits are located with the first element name that produces at least
/// one accepted dataset; results from different element names are never
/// merged. Inside a hit, identifier, name and location are each resolved
/// independently, so mixed-namespace hits still parse. The paging
/// attributes come from the response root.
pub fn parse_datasets_search(xml: &[u8]) -> ParseResult<SearchPage> {
    let document = Document::parse(xml)?;
    let root = document.root();

    let datasets = first_non_empty(&PROCESS_ELEMENTS, |name| {
        root.find_all(*name).filter_map(summary_from).collect()
    });

    let page = SearchPage {
        datasets,
        total_size: numeric_attribute(root, "totalSize"),
        start_index: numeric_attribute(root, "startIndex"),
        page_size: numeric_attribute(root, "pageSize"),
    };

    debug!(
        count = page.datasets.len(),
        total = ?page.total_size,
        "parsed dataset search page"
    );
    Ok(page)
}

fn summary_from(element: &Element) -> Option<DatasetSummary> {
    let text = |paths: FieldPaths<'static>| paths.descendant_text(element).map(str::to_string);
    DatasetSummary::from_parts(text(UUID_PATHS), text(NAME_PATHS), text(LOCATION_PATHS))
}

fn numeric_attribute(element: &Element, local: &str) -> Option<u64> {
    element
        .attribute(Name::bare(local))
        .and_then(|value| value.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_service_api_shape() {
        let xml = br#"<?xml version="1.0" encoding="UTF-8"?><processDataSet totalSize="1" xmlns="http://www.ilcd-network.org/ILCD/ServiceAPI"><processDataSet><uuid>test-uuid</uuid><baseName>Test Process</baseName></processDataSet></processDataSet>"#;

        let page = parse_datasets_search(xml).unwrap();
        assert_eq!(page.datasets, vec![DatasetSummary::new("test-uuid", "Test Process")]);
        assert_eq!(page.total_size, Some(1));
        assert_eq!(page.datasets[0].dataset_type, "Process");
    }

    #[test]
    fn test_process_shape_with_paging() {
        let xml = br#"<sapi:dataSetList xmlns:sapi="http://www.ilcd-network.org/ILCD/ServiceAPI"
                xmlns:p="http://www.ilcd-network.org/ILCD/ServiceAPI/Process"
                totalSize="57" startIndex="20" pageSize="20">
                <p:process>
                    <sapi:uuid>0a1b</sapi:uuid>
                    <sapi:name>Steel production</sapi:name>
                    <p:location>DE</p:location>
                </p:process>
                <p:process>
                    <sapi:uuid>2c3d</sapi:uuid>
                    <sapi:name>Cement</sapi:name>
                </p:process>
            </sapi:dataSetList>"#;

        let page = parse_datasets_search(xml).unwrap();
        assert_eq!(
            page.datasets,
            vec![
                DatasetSummary::new("0a1b", "Steel production").with_location("DE"),
                DatasetSummary::new("2c3d", "Cement"),
            ]
        );
        assert_eq!(page.total_size, Some(57));
        assert_eq!(page.start_index, Some(20));
        assert_eq!(page.page_size, Some(20));
    }

    #[test]
    fn test_fields_resolve_independently() {
        // uuid via the process namespace, name via the bare fallback
        let xml = br#"<list xmlns:p="http://www.ilcd-network.org/ILCD/ServiceAPI/Process">
                <p:process><p:uuid>mixed</p:uuid><name>Bare name</name></p:process>
            </list>"#;

        let page = parse_datasets_search(xml).unwrap();
        assert_eq!(page.datasets, vec![DatasetSummary::new("mixed", "Bare name")]);
        assert_eq!(page.total_size, None);
    }

    #[test]
    fn test_results_from_different_shapes_not_merged() {
        let xml = br#"<list xmlns:sapi="http://www.ilcd-network.org/ILCD/ServiceAPI">
                <sapi:processDataSet><sapi:uuid>a</sapi:uuid><sapi:name>A</sapi:name></sapi:processDataSet>
                <process><uuid>b</uuid><name>B</name></process>
            </list>"#;

        let page = parse_datasets_search(xml).unwrap();
        assert_eq!(page.datasets, vec![DatasetSummary::new("a", "A")]);
    }

    #[test]
    fn test_hits_without_name_or_uuid_dropped() {
        let xml = br#"<list>
                <process><uuid>only-uuid</uuid></process>
                <process><name>Only name</name></process>
                <process><uuid>ok</uuid><name>Kept</name></process>
            </list>"#;

        let page = parse_datasets_search(xml).unwrap();
        assert_eq!(page.datasets, vec![DatasetSummary::new("ok", "Kept")]);
    }

    #[test]
    fn test_non_numeric_total_ignored() {
        let page = parse_datasets_search(br#"<list totalSize="many"/>"#).unwrap();
        assert!(page.is_empty());
        assert_eq!(page.total_size, None);
    }
}
