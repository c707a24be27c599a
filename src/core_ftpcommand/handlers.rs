use crate::core_ftpcommand::ftpcommand::FtpCommand;
use crate::server::ServerState;
use crate::session::Session;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tokio::net::tcp::OwnedWriteHalf;
use tokio::sync::Mutex as TokioMutex;

// Specific modules for PASV/EPSV and PORT negotiation
use crate::core_network::pasv;
use crate::core_network::port;

/// Every handler receives the control writer, the shared server state,
/// the session, and the decoded parameter, and returns whether the
/// session continues.
type CommandHandler = Box<
    dyn Fn(
            Arc<TokioMutex<OwnedWriteHalf>>,
            Arc<ServerState>,
            Arc<TokioMutex<Session>>,
            Option<String>, // None, Some("") and Some(text) are distinct
        ) -> Pin<Box<dyn Future<Output = Result<bool, std::io::Error>> + Send>>
        + Send
        + Sync,
>;

/// Builds the verb dispatch table. In read-only mode the mutating verbs
/// are overridden with a uniform refusal instead of being removed, so the
/// verb is still recognized but always denied.
pub fn initialize_command_handlers(readonly: bool) -> HashMap<FtpCommand, Arc<CommandHandler>> {
    let mut handlers: HashMap<FtpCommand, Arc<CommandHandler>> = HashMap::new();

    handlers.insert(
        FtpCommand::USER,
        Arc::new(Box::new(|writer, state, session, param| {
            Box::pin(crate::core_ftpcommand::user::handle_user_command(
                writer, state, session, param,
            ))
        })),
    );

    handlers.insert(
        FtpCommand::PASS,
        Arc::new(Box::new(|writer, state, session, param| {
            Box::pin(crate::core_ftpcommand::pass::handle_pass_command(
                writer, state, session, param,
            ))
        })),
    );

    handlers.insert(
        FtpCommand::QUIT,
        Arc::new(Box::new(|writer, state, session, param| {
            Box::pin(crate::core_ftpcommand::quit::handle_quit_command(
                writer, state, session, param,
            ))
        })),
    );

    handlers.insert(
        FtpCommand::PWD,
        Arc::new(Box::new(|writer, state, session, param| {
            Box::pin(crate::core_ftpcommand::pwd::handle_pwd_command(
                writer, state, session, param,
            ))
        })),
    );

    handlers.insert(
        FtpCommand::CWD,
        Arc::new(Box::new(|writer, state, session, param| {
            Box::pin(crate::core_ftpcommand::cwd::handle_cwd_command(
                writer, state, session, param,
            ))
        })),
    );

    handlers.insert(
        FtpCommand::CDUP,
        Arc::new(Box::new(|writer, state, session, param| {
            Box::pin(crate::core_ftpcommand::cdup::handle_cdup_command(
                writer, state, session, param,
            ))
        })),
    );

    handlers.insert(
        FtpCommand::LIST,
        Arc::new(Box::new(|writer, state, session, param| {
            Box::pin(crate::core_ftpcommand::list::handle_list_command(
                writer, state, session, param,
            ))
        })),
    );

    handlers.insert(
        FtpCommand::NLST,
        Arc::new(Box::new(|writer, state, session, param| {
            Box::pin(crate::core_ftpcommand::nlst::handle_nlst_command(
                writer, state, session, param,
            ))
        })),
    );

    handlers.insert(
        FtpCommand::NOOP,
        Arc::new(Box::new(|writer, state, session, param| {
            Box::pin(crate::core_ftpcommand::noop::handle_noop_command(
                writer, state, session, param,
            ))
        })),
    );

    handlers.insert(
        FtpCommand::MKD,
        Arc::new(Box::new(|writer, state, session, param| {
            Box::pin(crate::core_ftpcommand::mkd::handle_mkd_command(
                writer, state, session, param,
            ))
        })),
    );

    handlers.insert(
        FtpCommand::RMD,
        Arc::new(Box::new(|writer, state, session, param| {
            Box::pin(crate::core_ftpcommand::rmd::handle_rmd_command(
                writer, state, session, param,
            ))
        })),
    );

    handlers.insert(
        FtpCommand::DELE,
        Arc::new(Box::new(|writer, state, session, param| {
            Box::pin(crate::core_ftpcommand::dele::handle_dele_command(
                writer, state, session, param,
            ))
        })),
    );

    handlers.insert(
        FtpCommand::RNFR,
        Arc::new(Box::new(|writer, state, session, param| {
            Box::pin(crate::core_ftpcommand::rnfr::handle_rnfr_command(
                writer, state, session, param,
            ))
        })),
    );

    handlers.insert(
        FtpCommand::RNTO,
        Arc::new(Box::new(|writer, state, session, param| {
            Box::pin(crate::core_ftpcommand::rnto::handle_rnto_command(
                writer, state, session, param,
            ))
        })),
    );

    handlers.insert(
        FtpCommand::RETR,
        Arc::new(Box::new(|writer, state, session, param| {
            Box::pin(crate::core_ftpcommand::retr::handle_retr_command(
                writer, state, session, param,
            ))
        })),
    );

    handlers.insert(
        FtpCommand::STOR,
        Arc::new(Box::new(|writer, state, session, param| {
            Box::pin(crate::core_ftpcommand::stor::handle_stor_command(
                writer, state, session, param,
            ))
        })),
    );

    handlers.insert(
        FtpCommand::PASV,
        Arc::new(Box::new(|writer, state, session, param| {
            Box::pin(pasv::handle_pasv_command(writer, state, session, param))
        })),
    );

    handlers.insert(
        FtpCommand::EPSV,
        Arc::new(Box::new(|writer, state, session, param| {
            Box::pin(pasv::handle_epsv_command(writer, state, session, param))
        })),
    );

    handlers.insert(
        FtpCommand::PORT,
        Arc::new(Box::new(|writer, state, session, param| {
            Box::pin(port::handle_port_command(writer, state, session, param))
        })),
    );

    handlers.insert(
        FtpCommand::SITE,
        Arc::new(Box::new(|writer, state, session, param| {
            Box::pin(crate::core_ftpcommand::site::handle_site_command(
                writer, state, session, param,
            ))
        })),
    );

    handlers.insert(
        FtpCommand::FEAT,
        Arc::new(Box::new(|writer, state, session, param| {
            Box::pin(crate::core_ftpcommand::feat::handle_feat_command(
                writer, state, session, param,
            ))
        })),
    );

    handlers.insert(
        FtpCommand::OPTS,
        Arc::new(Box::new(|writer, state, session, param| {
            Box::pin(crate::core_ftpcommand::opts::handle_opts_command(
                writer, state, session, param,
            ))
        })),
    );

    handlers.insert(
        FtpCommand::HELP,
        Arc::new(Box::new(|writer, state, session, param| {
            Box::pin(crate::core_ftpcommand::help::handle_help_command(
                writer, state, session, param,
            ))
        })),
    );

    handlers.insert(
        FtpCommand::SYST,
        Arc::new(Box::new(|writer, state, session, param| {
            Box::pin(crate::core_ftpcommand::syst::handle_syst_command(
                writer, state, session, param,
            ))
        })),
    );

    handlers.insert(
        FtpCommand::STAT,
        Arc::new(Box::new(|writer, state, session, param| {
            Box::pin(crate::core_ftpcommand::stat::handle_stat_command(
                writer, state, session, param,
            ))
        })),
    );

    handlers.insert(
        FtpCommand::SIZE,
        Arc::new(Box::new(|writer, state, session, param| {
            Box::pin(crate::core_ftpcommand::size::handle_size_command(
                writer, state, session, param,
            ))
        })),
    );

    handlers.insert(
        FtpCommand::TYPE,
        Arc::new(Box::new(|writer, state, session, param| {
            Box::pin(crate::core_ftpcommand::type_::handle_type_command(
                writer, state, session, param,
            ))
        })),
    );

    handlers.insert(
        FtpCommand::MODE,
        Arc::new(Box::new(|writer, state, session, param| {
            Box::pin(crate::core_ftpcommand::mode::handle_mode_command(
                writer, state, session, param,
            ))
        })),
    );

    handlers.insert(
        FtpCommand::STRU,
        Arc::new(Box::new(|writer, state, session, param| {
            Box::pin(crate::core_ftpcommand::stru::handle_stru_command(
                writer, state, session, param,
            ))
        })),
    );

    if readonly {
        let mutating: Vec<FtpCommand> = handlers
            .keys()
            .copied()
            .filter(|command| command.is_mutating())
            .collect();
        for command in mutating {
            handlers.insert(
                command,
                Arc::new(Box::new(|writer, state, session, param| {
                    Box::pin(crate::core_ftpcommand::utils::handle_no_permission(
                        writer, state, session, param,
                    ))
                })),
            );
        }
    }

    handlers
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_supported_verb_has_a_handler() {
        let handlers = initialize_command_handlers(false);
        for command in [
            FtpCommand::USER,
            FtpCommand::PASS,
            FtpCommand::QUIT,
            FtpCommand::PWD,
            FtpCommand::CWD,
            FtpCommand::CDUP,
            FtpCommand::LIST,
            FtpCommand::NLST,
            FtpCommand::NOOP,
            FtpCommand::MKD,
            FtpCommand::RMD,
            FtpCommand::DELE,
            FtpCommand::RNFR,
            FtpCommand::RNTO,
            FtpCommand::RETR,
            FtpCommand::STOR,
            FtpCommand::PORT,
            FtpCommand::PASV,
            FtpCommand::EPSV,
            FtpCommand::SITE,
            FtpCommand::FEAT,
            FtpCommand::OPTS,
            FtpCommand::HELP,
            FtpCommand::SYST,
            FtpCommand::STAT,
            FtpCommand::SIZE,
            FtpCommand::TYPE,
            FtpCommand::MODE,
            FtpCommand::STRU,
        ] {
            assert!(handlers.contains_key(&command), "{:?} missing", command);
        }
    }

    #[test]
    fn readonly_table_keeps_the_mutating_verbs_registered() {
        let readwrite = initialize_command_handlers(false);
        let readonly = initialize_command_handlers(true);
        assert_eq!(readwrite.len(), readonly.len());
        assert!(readonly.contains_key(&FtpCommand::STOR));
        assert!(readonly.contains_key(&FtpCommand::DELE));
    }
}
