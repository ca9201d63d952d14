#[cfg(feature = "gui")]
fn main() -> glib::ExitCode {
    folio::logging::init();
    folio::ui::app::run()
}

#[cfg(not(feature = "gui"))]
fn main() -> glib::ExitCode {
    folio::logging::init();
    folio::demo::run()
}
