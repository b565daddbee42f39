use painting::MeshError;
use sculpting::SculptError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorkbenchError {
    #[error("No target surface to bind; assign a mesh before enabling the workbench")]
    MissingTarget,
    #[error(transparent)]
    Sculpt(#[from] SculptError),
    #[error(transparent)]
    Mesh(#[from] MeshError),
}
