pub mod context;
pub mod init;
pub mod run;
pub mod watch;

pub use context::{apply_overrides, color_choice_to_mode, load_config, write_output};
pub use init::{generate_config_template, run_init, run_init_impl};
pub use run::{run_checker, run_checker_impl};
pub use watch::{run_watch, run_watch_impl};
