pub(crate) mod frustum;
pub(crate) mod resolver;
