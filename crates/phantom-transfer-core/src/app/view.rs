use super::state::{Status, ViewSnapshot};
use std::fmt;

/// URL of the extension's install page.
pub const PHANTOM_INSTALL_URL: &str = "https://phantom.app/";

/// The four buttons of the demo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Generate and fund a sender
    CreateAccount,
    /// Ask the wallet for its key
    ConnectWallet,
    /// End the wallet session
    DisconnectWallet,
    /// Send from the sender to the wallet
    Transfer,
}

impl Action {
    /// All buttons, in page order
    pub const ALL: [Action; 4] = [
        Action::CreateAccount,
        Action::ConnectWallet,
        Action::DisconnectWallet,
        Action::Transfer,
    ];

    /// Button caption
    pub fn label(&self) -> &'static str {
        match self {
            Action::CreateAccount => "Create a New Solana Account",
            Action::ConnectWallet => "Connect to Phantom Wallet",
            Action::DisconnectWallet => "Disconnect from Wallet",
            Action::Transfer => "Transfer SOL to Phantom Wallet",
        }
    }

    /// Whether the button is rendered for this state
    pub fn is_visible(&self, view: &ViewSnapshot) -> bool {
        match self {
            Action::CreateAccount => true,
            Action::ConnectWallet => view.provider_present && view.receiver.is_none(),
            Action::DisconnectWallet => view.provider_present && view.receiver.is_some(),
            Action::Transfer => view.can_transfer(),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Shown instead of the wallet buttons when no provider was detected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallNotice {
    /// Leading text
    pub message: String,
    /// Link caption
    pub link_text: String,
    /// Link target
    pub url: String,
}

impl InstallNotice {
    /// The notice pointing at `url`
    pub fn phantom(url: impl Into<String>) -> Self {
        Self {
            message: "No provider found. Install".to_string(),
            link_text: "Phantom Browser extension".to_string(),
            url: url.into(),
        }
    }
}

impl fmt::Display for InstallNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} ({})", self.message, self.link_text, self.url)
    }
}

/// One rendering of the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Screen {
    /// Page heading
    pub title: String,
    /// Visible buttons, in page order
    pub buttons: Vec<Action>,
    /// "Public Key: ..." next to the create button
    pub sender_label: Option<String>,
    /// Set when no provider was detected
    pub install_notice: Option<InstallNotice>,
    /// Last status line
    pub status: Option<Status>,
}

impl Screen {
    /// Returns true if `action` is rendered
    pub fn shows(&self, action: Action) -> bool {
        self.buttons.contains(&action)
    }
}

/// Renders the page for a state snapshot.
pub fn render(view: &ViewSnapshot, title: &str, install_url: &str) -> Screen {
    Screen {
        title: title.to_string(),
        buttons: visible_actions(view),
        sender_label: view.sender.map(|pubkey| format!("Public Key: {pubkey}")),
        install_notice: (!view.provider_present).then(|| InstallNotice::phantom(install_url)),
        status: view.status.clone(),
    }
}

/// Buttons rendered for a state snapshot, in page order.
pub fn visible_actions(view: &ViewSnapshot) -> Vec<Action> {
    Action::ALL
        .into_iter()
        .filter(|action| action.is_visible(view))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use phantom_transfer_solana::LocalAccount;

    fn key() -> phantom_transfer_solana::Pubkey {
        LocalAccount::generate().pubkey()
    }

    #[test]
    fn test_no_provider_shows_notice_and_create_only() {
        let screen = render(&ViewSnapshot::default(), "Demo", PHANTOM_INSTALL_URL);
        assert_eq!(screen.buttons, vec![Action::CreateAccount]);
        let notice = screen.install_notice.unwrap();
        assert_eq!(
            notice.to_string(),
            "No provider found. Install Phantom Browser extension (https://phantom.app/)"
        );
    }

    #[test]
    fn test_provider_without_receiver_shows_connect() {
        let view = ViewSnapshot {
            provider_present: true,
            ..ViewSnapshot::default()
        };
        let screen = render(&view, "Demo", PHANTOM_INSTALL_URL);
        assert_eq!(screen.buttons, vec![Action::CreateAccount, Action::ConnectWallet]);
        assert!(screen.install_notice.is_none());
    }

    #[test]
    fn test_connected_without_sender_hides_transfer() {
        let view = ViewSnapshot {
            provider_present: true,
            receiver: Some(key()),
            ..ViewSnapshot::default()
        };
        let screen = render(&view, "Demo", PHANTOM_INSTALL_URL);
        assert!(screen.shows(Action::DisconnectWallet));
        assert!(!screen.shows(Action::ConnectWallet));
        assert!(!screen.shows(Action::Transfer));
    }

    #[test]
    fn test_all_set_shows_transfer_and_label() {
        let sender = key();
        let view = ViewSnapshot {
            provider_present: true,
            receiver: Some(key()),
            sender: Some(sender),
            ..ViewSnapshot::default()
        };
        let screen = render(&view, "Demo", PHANTOM_INSTALL_URL);
        assert_eq!(
            screen.buttons,
            vec![Action::CreateAccount, Action::DisconnectWallet, Action::Transfer]
        );
        assert_eq!(screen.sender_label, Some(format!("Public Key: {sender}")));
    }

    #[test]
    fn test_labels() {
        assert_eq!(Action::Transfer.to_string(), "Transfer SOL to Phantom Wallet");
        assert_eq!(Action::CreateAccount.label(), "Create a New Solana Account");
    }
}
