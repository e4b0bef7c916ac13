use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbPlotSceneGraphError {
    #[error("Internal error: `{0}`")]
    InternalError(String),

    #[error("Mark `{mark}` has {len} instances but channel `{channel}` has {found} values")]
    ChannelLengthMismatch {
        mark: String,
        channel: &'static str,
        len: usize,
        found: usize,
    },

    #[error("JSON error: `{0}`")]
    JsonError(#[from] serde_json::Error),
}
