// Unit tests harness
mod symbol {
    include!("symbol.rs");
}
mod value {
    include!("value.rs");
}
mod guard {
    include!("guard.rs");
}
mod config {
    include!("config.rs");
}
