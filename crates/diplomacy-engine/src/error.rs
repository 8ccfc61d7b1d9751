use diplomacy_protocol::{OrderRejection, PowerName};

/// Errors the engine contract can raise. These are funneled into
/// `diplomacy_protocol::ErrorKind` at the adapter boundary (component F) and
/// are never surfaced to callers by name.
#[derive(Clone, Debug, thiserror::Error)]
pub enum EngineError {
    #[error("unknown map: {0}")]
    UnknownMap(String),
    #[error("unknown power: {0}")]
    UnknownPower(PowerName),
    #[error("power {0} is already controlled")]
    PowerAlreadyControlled(PowerName),
    #[error("game is not accepting orders in its current phase")]
    NotOrderable,
    #[error("one or more submitted orders were rejected")]
    OrdersRejected(Vec<OrderRejection>),
    #[error("no pending retreat for power {0}")]
    NoPendingRetreat(PowerName),
}
