//! Data stock listings (`GET /resource/datastocks`)

use bwilcd_core::Stock;
use tracing::debug;

use crate::document::{Document, Element, Name};
use crate::error::ParseResult;
use crate::fallback::first_non_empty;
use crate::namespaces;

/// Namespace bindings for stock elements, in priority order
const STOCK_BINDINGS: [Option<&str>; 3] = [
    Some(namespaces::SERVICE_API),
    Some(namespaces::SERVICE_API_SLASH),
    None,
];

/// Parse a data stock listing.
///
/// Each namespace binding is tried in turn; the first one under which at
/// least one valid stock is found decides the result. Stocks without an
/// identifier or short name are dropped.
pub fn parse_stocks(xml: &[u8]) -> ParseResult<Vec<Stock>> {
    let document = Document::parse(xml)?;
    let stocks = first_non_empty(&STOCK_BINDINGS, |binding| {
        stocks_with_binding(document.root(), *binding)
    });

    debug!(count = stocks.len(), "parsed data stocks");
    Ok(stocks)
}

fn stocks_with_binding(root: &Element, binding: Option<&str>) -> Vec<Stock> {
    root.find_all(Name::with(binding, "dataStock"))
        .filter_map(|element| stock_from(element, binding))
        .collect()
}

fn stock_from(element: &Element, binding: Option<&str>) -> Option<Stock> {
    let field = |local: &str| {
        element
            .child(Name::with(binding, local))
            .map(|e| e.text().unwrap_or_default().to_string())
    };

    let stock = Stock::from_parts(field("uuid"), field("shortName"), field("description"));
    if stock.is_none() {
        debug!("dropping dataStock without uuid or shortName");
    }
    stock
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_single_stock_without_description() {
        let xml = br#"<?xml version="1.0" encoding="UTF-8"?>
            <dataStockList xmlns="http://www.ilcd-network.org/ILCD/ServiceAPI">
                <dataStock><uuid>s-1</uuid><shortName>Test Stock</shortName></dataStock>
            </dataStockList>"#;

        let stocks = parse_stocks(xml).unwrap();
        assert_eq!(stocks, vec![Stock::new("s-1", "Test Stock")]);
    }

    #[test]
    fn test_latin1_stock_listing() {
        let xml = b"<?xml version=\"1.0\" encoding=\"ISO-8859-1\"?>\
            <dataStockList xmlns=\"http://www.ilcd-network.org/ILCD/ServiceAPI\">\
            <dataStock><uuid>s-1</uuid><shortName>M\xFCll</shortName></dataStock>\
            </dataStockList>";

        let stocks = parse_stocks(xml).unwrap();
        assert_eq!(stocks, vec![Stock::new("s-1", "M\u{fc}ll")]);
    }

    #[test]
    fn test_empty_description_element() {
        let xml = br#"<dataStockList xmlns="http://www.ilcd-network.org/ILCD/ServiceAPI">
                <dataStock><uuid>s-1</uuid><shortName>A</shortName><description/></dataStock>
            </dataStockList>"#;

        let stocks = parse_stocks(xml).unwrap();
        assert_eq!(stocks[0].description, "");
    }

    #[test]
    fn test_trailing_slash_namespace() {
        let xml = br#"<sapi:dataStockList xmlns:sapi="http://www.ilcd-network.org/ILCD/ServiceAPI/">
                <sapi:dataStock>
                    <sapi:uuid>s-2</sapi:uuid>
                    <sapi:shortName>Slash</sapi:shortName>
                    <sapi:description>Served with a trailing slash</sapi:description>
                </sapi:dataStock>
            </sapi:dataStockList>"#;

        let stocks = parse_stocks(xml).unwrap();
        assert_eq!(
            stocks,
            vec![Stock::new("s-2", "Slash").with_description("Served with a trailing slash")]
        );
    }

    #[test]
    fn test_first_binding_with_results_wins() {
        // The bare stock is only consulted when no namespaced stock is valid
        let xml = br#"<list xmlns:sapi="http://www.ilcd-network.org/ILCD/ServiceAPI">
                <sapi:dataStock><sapi:uuid>ns</sapi:uuid><sapi:shortName>Namespaced</sapi:shortName></sapi:dataStock>
                <dataStock><uuid>bare</uuid><shortName>Bare</shortName></dataStock>
            </list>"#;

        let stocks = parse_stocks(xml).unwrap();
        assert_eq!(stocks, vec![Stock::new("ns", "Namespaced")]);
    }

    #[test]
    fn test_invalid_namespaced_stocks_fall_through() {
        let xml = br#"<list xmlns:sapi="http://www.ilcd-network.org/ILCD/ServiceAPI">
                <sapi:dataStock><sapi:uuid>no-name</sapi:uuid></sapi:dataStock>
                <dataStock><uuid>bare</uuid><shortName>Bare</shortName></dataStock>
            </list>"#;

        let stocks = parse_stocks(xml).unwrap();
        assert_eq!(stocks, vec![Stock::new("bare", "Bare")]);
    }

    #[test]
    fn test_no_stocks_is_empty_not_error() {
        let stocks = parse_stocks(b"<dataStockList/>").unwrap();
        assert!(stocks.is_empty());
    }
}
