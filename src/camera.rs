pub(crate) mod model;
pub(crate) mod virtual_camera;
