use crate::node::NodeIndex;
use std::{error::Error, fmt};

#[derive(Debug, Clone, PartialEq)]
pub enum GraphError {
    Empty,
    /// The successor list does not have one entry per quad.
    LinkCountMismatch { quads: usize, links: usize },
    SuccessorOutOfRange { node: NodeIndex, successor: NodeIndex },
    TooManySuccessors { node: NodeIndex, successors: usize },
    /// Zero-length center line, zero width, or non-finite corners.
    DegenerateQuad(NodeIndex),
}

impl fmt::Display for GraphError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GraphError::Empty => write!(f, "track has no quads"),
            GraphError::LinkCountMismatch { quads, links } => write!(
                f,
                "track has {} quads but {} successor lists",
                quads, links,
            ),
            GraphError::SuccessorOutOfRange { node, successor } => write!(
                f,
                "node {} links to successor {}, which does not exist",
                node, successor,
            ),
            GraphError::TooManySuccessors { node, successors } => {
                write!(f, "node {} has {} successors", node, successors)
            }
            GraphError::DegenerateQuad(node) => write!(f, "quad of node {} is degenerate", node),
        }
    }
}

impl Error for GraphError {}
