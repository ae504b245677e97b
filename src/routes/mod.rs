pub mod accesorios;
pub mod ajustes;
pub mod almacen;
pub mod auth;
pub mod compras;
pub mod docs;
pub mod health_check;
pub mod index;
pub mod proyectos;
pub mod solicitudes;

pub use health_check::*;

/// URL prefixes of the registered blueprints; the main blueprint mounts at
/// the root with no prefix. Prefixes are disjoint, so registration order
/// does not affect routing.
pub const BLUEPRINT_PREFIXES: [&str; 7] = [
    "/auth",
    "/solicitudes",
    "/ajustes",
    "/proyectos",
    "/accesorios",
    "/almacen",
    "/compras",
];
