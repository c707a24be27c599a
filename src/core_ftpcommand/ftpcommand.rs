#[derive(Eq, Hash, PartialEq, Debug, Clone, Copy)]
pub enum FtpCommand {
    USER,
    PASS,
    QUIT,
    PWD,
    CWD,
    CDUP,
    LIST,
    NLST,
    NOOP,
    MKD,
    RMD,
    DELE,
    RNFR,
    RNTO,
    RETR,
    STOR,
    PORT,
    PASV,
    EPSV,
    SITE,
    FEAT,
    OPTS,
    HELP,
    SYST,
    STAT,
    SIZE,
    TYPE,
    MODE,
    STRU,
}

impl FtpCommand {
    /// Maps a case-folded verb to its command, folding the historical
    /// X-prefixed aliases onto the modern verbs.
    pub fn from_str(cmd: &str) -> Option<FtpCommand> {
        match cmd.to_ascii_uppercase().as_str() {
            "USER" => Some(FtpCommand::USER),
            "PASS" => Some(FtpCommand::PASS),
            "QUIT" => Some(FtpCommand::QUIT),
            "PWD" | "XPWD" => Some(FtpCommand::PWD),
            "CWD" | "XCWD" => Some(FtpCommand::CWD),
            "CDUP" | "XCUP" => Some(FtpCommand::CDUP),
            "LIST" => Some(FtpCommand::LIST),
            "NLST" => Some(FtpCommand::NLST),
            "NOOP" => Some(FtpCommand::NOOP),
            "MKD" | "XMKD" => Some(FtpCommand::MKD),
            "RMD" | "XRMD" => Some(FtpCommand::RMD),
            "DELE" => Some(FtpCommand::DELE),
            "RNFR" => Some(FtpCommand::RNFR),
            "RNTO" => Some(FtpCommand::RNTO),
            "RETR" => Some(FtpCommand::RETR),
            "STOR" => Some(FtpCommand::STOR),
            "PORT" => Some(FtpCommand::PORT),
            "PASV" => Some(FtpCommand::PASV),
            "EPSV" => Some(FtpCommand::EPSV),
            "SITE" => Some(FtpCommand::SITE),
            "FEAT" => Some(FtpCommand::FEAT),
            "OPTS" => Some(FtpCommand::OPTS),
            "HELP" => Some(FtpCommand::HELP),
            "SYST" => Some(FtpCommand::SYST),
            "STAT" => Some(FtpCommand::STAT),
            "SIZE" => Some(FtpCommand::SIZE),
            "TYPE" => Some(FtpCommand::TYPE),
            "MODE" => Some(FtpCommand::MODE),
            "STRU" => Some(FtpCommand::STRU),
            _ => None,
        }
    }

    /// Verbs that change the filesystem, replaced wholesale in read-only
    /// mode.
    pub fn is_mutating(&self) -> bool {
        matches!(
            self,
            FtpCommand::MKD
                | FtpCommand::RMD
                | FtpCommand::DELE
                | FtpCommand::RNFR
                | FtpCommand::RNTO
                | FtpCommand::STOR
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbs_are_case_insensitive() {
        assert_eq!(FtpCommand::from_str("pasv"), Some(FtpCommand::PASV));
        assert_eq!(FtpCommand::from_str("PaSv"), Some(FtpCommand::PASV));
    }

    #[test]
    fn x_aliases_fold_onto_modern_verbs() {
        assert_eq!(FtpCommand::from_str("XPWD"), Some(FtpCommand::PWD));
        assert_eq!(FtpCommand::from_str("XCWD"), Some(FtpCommand::CWD));
        assert_eq!(FtpCommand::from_str("XCUP"), Some(FtpCommand::CDUP));
        assert_eq!(FtpCommand::from_str("XMKD"), Some(FtpCommand::MKD));
        assert_eq!(FtpCommand::from_str("XRMD"), Some(FtpCommand::RMD));
    }

    #[test]
    fn unknown_verbs_are_none() {
        assert_eq!(FtpCommand::from_str("ABOR"), None);
        assert_eq!(FtpCommand::from_str(""), None);
    }

    #[test]
    fn mutating_set_covers_the_write_commands() {
        assert!(FtpCommand::STOR.is_mutating());
        assert!(FtpCommand::DELE.is_mutating());
        assert!(!FtpCommand::RETR.is_mutating());
        assert!(!FtpCommand::LIST.is_mutating());
    }
}
