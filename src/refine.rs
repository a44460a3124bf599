pub(crate) mod edge_blur;
pub(crate) mod passes;
pub(crate) mod quality;
