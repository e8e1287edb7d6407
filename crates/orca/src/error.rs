pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{name} must be in [0, 1], got {value}")]
    ParameterOutOfRange { name: &'static str, value: f64 },

    #[error("link references a missing node: {id}")]
    MissingNode { id: String },

    #[error("unknown event type: {typename}")]
    UnknownEventType { typename: String },
}
