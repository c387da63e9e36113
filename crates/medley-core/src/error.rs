use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Chart declares no tempo marker")]
    MissingTempo,

    #[error("Slide chain ended without both a start and an end note")]
    SlideWithoutEndpoints,

    #[error("Attach note at beat {beat} has no placed anchor on both sides")]
    AttachWithoutAnchor { beat: f64 },
}

pub type Result<T> = std::result::Result<T, Error>;
