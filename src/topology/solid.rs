use std::sync::Arc;

use super::Face;

#[derive(Debug)]
pub(crate) struct ShellNode {
    pub(crate) faces: Vec<Face>,
}

/// A connected set of faces glued along shared edges.
#[derive(Debug, Clone)]
pub(crate) struct Shell(pub(crate) Arc<ShellNode>);

impl Shell {
    pub(crate) fn new(faces: Vec<Face>) -> Self {
        Self(Arc::new(ShellNode { faces }))
    }

    pub(crate) fn faces(&self) -> &[Face] {
        &self.0.faces
    }

    /// Whether every edge is used exactly once in each direction.
    pub(crate) fn is_closed(&self) -> bool {
        let mut uses: std::collections::HashMap<usize, (u32, u32)> =
            std::collections::HashMap::new();
        for face in &self.0.faces {
            for oe in face.oriented_edges() {
                let entry = uses.entry(oe.edge.key()).or_default();
                if oe.forward {
                    entry.0 += 1;
                } else {
                    entry.1 += 1;
                }
            }
        }
        !uses.is_empty() && uses.values().all(|&(f, r)| f == 1 && r == 1)
    }
}

#[derive(Debug)]
pub(crate) struct SolidNode {
    /// Outer boundary first, then voids.
    pub(crate) shells: Vec<Shell>,
}

/// A volume bounded by an outer shell and optional inner void shells.
#[derive(Debug, Clone)]
pub(crate) struct Solid(pub(crate) Arc<SolidNode>);

impl Solid {
    pub(crate) fn new(shells: Vec<Shell>) -> Self {
        Self(Arc::new(SolidNode { shells }))
    }

    pub(crate) fn from_faces(faces: Vec<Face>) -> Self {
        Self::new(vec![Shell::new(faces)])
    }

    pub(crate) fn shells(&self) -> &[Shell] {
        &self.0.shells
    }

    pub(crate) fn faces(&self) -> impl Iterator<Item = &Face> {
        self.0.shells.iter().flat_map(|s| s.faces().iter())
    }
}
