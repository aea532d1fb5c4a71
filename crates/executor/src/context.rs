//! Request context supplied by the transport.

/// Transport-level facts accompanying a command.
///
/// The only fact the executor needs today is the routing indicator the
/// transport extracted from its framing (a routing header, in the real
/// protocol). A command naming a non-default database is rejected unless
/// the context routes to that database.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    /// Database the transport routed this request to, if any.
    pub routing: Option<String>,
}

impl RequestContext {
    /// Context with no routing indicator (default-database traffic).
    pub fn new() -> Self {
        RequestContext::default()
    }

    /// Context routed to a named database.
    pub fn routed_to(database: impl Into<String>) -> Self {
        RequestContext {
            routing: Some(database.into()),
        }
    }
}
