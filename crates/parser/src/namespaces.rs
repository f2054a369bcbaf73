//! XML namespaces used by ILCD Service-API responses

/// Service-API envelope (stock listings, search results)
pub const SERVICE_API: &str = "http://www.ilcd-network.org/ILCD/ServiceAPI";

/// Same namespace with a trailing slash, as sent by some node versions
pub const SERVICE_API_SLASH: &str = "http://www.ilcd-network.org/ILCD/ServiceAPI/";

/// Process entries of a Service-API search result
pub const SERVICE_API_PROCESS: &str = "http://www.ilcd-network.org/ILCD/ServiceAPI/Process";

/// Flow entries of a Service-API exchange listing
pub const SERVICE_API_FLOW: &str = "http://www.ilcd-network.org/ILCD/ServiceAPI/Flow";

/// ILCD process dataset schema
pub const ILCD_PROCESS: &str = "http://lca.jrc.it/ILCD/Process";

/// ILCD common schema (UUID, generalComment, referenceYear, ...)
pub const ILCD_COMMON: &str = "http://lca.jrc.it/ILCD/Common";

/// Namespace of the reserved `xml:` prefix (`xml:lang`)
pub const XML: &str = "http://www.w3.org/XML/1998/namespace";
