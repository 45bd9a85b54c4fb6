// One error type for the whole app.
// Every variant states *where* things went wrong.
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GlassError {
    /// Creating the window failed
    #[error("Window init error: {0}")]
    WindowInit(String),

    /// Updating the window buffer failed
    #[error("Window update error: {0}")]
    WindowUpdate(String),

    /// Reading or decoding the background picture failed
    #[error("Texture load error: {0}")]
    TextureLoad(String),

    /// Config file could not be parsed
    #[error("Config error: {0}")]
    Config(String),

    /// Design library file could not be read or written
    #[error("Library error: {0}")]
    Library(String),

    /// A design name was empty or blank
    #[error("Design name must not be empty")]
    InvalidName,

    /// No design with that id
    #[error("Design not found: {0}")]
    DesignNotFound(String),

    /// Render session driven out of order (e.g. start before a surface exists)
    #[error("Session error: {0}")]
    Session(String),

    /// Exported source text could not be read back
    #[error("Export parse error: {0}")]
    Export(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, GlassError>;
