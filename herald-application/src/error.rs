use herald_domain::error::DispatchError;

#[non_exhaustive]
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("dispatch: {0}")]
    Dispatch(#[from] DispatchError),

    #[error("serialization: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("missing recipient: event_type={event_type}, pointer={pointer}")]
    MissingRecipient { event_type: String, pointer: String },

    #[error("delivery failed: recipient={recipient}, reason={reason}")]
    Delivery { recipient: String, reason: String },
}
