mod handler;

pub mod helper;
pub mod site_df;
pub mod site_free;
pub mod site_kick;
pub mod site_passwd;
pub mod site_shutdown;
pub mod site_uptime;
pub mod site_who;

pub use handler::handle_site_command;
