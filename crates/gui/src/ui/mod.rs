pub mod design_panel;
pub mod properties;
pub mod status_bar;
