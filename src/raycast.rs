pub(crate) mod caster;
