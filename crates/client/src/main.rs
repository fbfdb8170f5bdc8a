//! Hexchat - terminal chat client
//!
//! Signs in, loads the chat, follows pushes and sends what you type.
//!
//! Commands: `/channels`, `/join <name|id>`, `/create <name>`,
//! `/rename <name>`, `/remove`, `/lang <ru|en>`, `/logout`, `/quit`.
//! Anything else is sent to the current channel.

#[cfg(not(target_arch = "wasm32"))]
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    native::run().await
}

#[cfg(target_arch = "wasm32")]
fn main() {}

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::collections::HashSet;
    use std::sync::Arc;

    use anyhow::{bail, Context};
    use hexchat_client::forms::LoginForm;
    use hexchat_client::session::stored_token;
    use hexchat_client::ws::{socket_io_url, ReconnectConfig, SocketIoConnection};
    use hexchat_client::{
        log_info, log_warn, ApiClient, ChatState, ChatStore, ChatSync, ClientConfig, FileStorage,
        GuardState, Language, RealtimeListener, SessionClient, SessionGuard, Storage,
    };
    use hexchat_shared::{MessageId, RequestFailure};
    use tokio::io::{AsyncBufReadExt, BufReader};

    pub async fn run() -> anyhow::Result<()> {
        hexchat_client::logging::init("hexchat_client=info,hexchat=info");

        let config = ClientConfig::from_env();
        let files = match &config.data_dir {
            Some(dir) => FileStorage::new(dir),
            None => FileStorage::default_location().context("no config directory on this platform")?,
        };
        log_info!("storing state in {}", files.dir().display());
        let storage: Arc<dyn Storage> = Arc::new(files);

        let language = Language::load(storage.as_ref());
        log_info!("language: {}", language);

        let api = ApiClient::new().with_base_url(config.api_url.clone());
        sign_in(&config, &api, &storage).await?;

        let token = stored_token(storage.as_ref());
        let api = api.with_token(token.clone());
        let store = ChatStore::seeded(storage.clone());
        let sync = ChatSync::new(api.clone(), store.clone());
        let session = SessionClient::new(api, storage.clone());

        let socket = SocketIoConnection::connect(
            socket_io_url(&config.socket_url, token.as_deref()),
            ReconnectConfig::default(),
        );
        RealtimeListener::attach(&socket, &store);

        if let Err(e) = sync.fetch_chat_data().await {
            log_warn!("could not load chat, showing cached channels: {}", e);
        }

        let printer = tokio::spawn(print_updates(store.clone()));

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Some(line) = lines.next_line().await? {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match handle_line(line, &sync, &session, storage.as_ref()).await {
                Flow::Continue => {}
                Flow::Quit => break,
            }
        }

        printer.abort();
        socket.close();
        Ok(())
    }

    async fn sign_in(
        config: &ClientConfig,
        api: &ApiClient,
        storage: &Arc<dyn Storage>,
    ) -> anyhow::Result<()> {
        let mut guard = SessionGuard::new(api.clone(), storage.clone());
        if guard.verify().await == GuardState::Granted {
            return Ok(());
        }

        let Some((username, password)) = &config.login else {
            bail!("not signed in: set HEXCHAT_USERNAME and HEXCHAT_PASSWORD");
        };
        let form = LoginForm::new(username.as_str(), password.as_str());
        if let Err(errors) = form.validate() {
            let keys: Vec<_> = errors.iter().map(|e| e.key).collect();
            bail!("invalid login: {}", keys.join(", "));
        }

        let session = SessionClient::new(api.clone(), storage.clone());
        session
            .login(&form.username, &form.password)
            .await
            .with_context(|| format!("login as {username} failed"))?;
        Ok(())
    }

    enum Flow {
        Continue,
        Quit,
    }

    async fn handle_line(
        line: &str,
        sync: &ChatSync,
        session: &SessionClient,
        storage: &dyn Storage,
    ) -> Flow {
        let (command, arg) = match line.strip_prefix('/') {
            Some(rest) => {
                let (cmd, arg) = rest.split_once(' ').unwrap_or((rest, ""));
                (Some(cmd), arg.trim())
            }
            None => (None, line),
        };
        let current = sync.store().select(|s| s.current_channel().cloned());

        match command {
            None => match current {
                Some(channel) => {
                    report("send", sync.send_message(arg, channel.id).await);
                }
                None => println!("no channel selected, /join one first"),
            },
            Some("channels") => {
                let state = sync.store().state();
                for channel in &state.channels {
                    let marker = if Some(channel.id) == state.current_channel_id { "*" } else { " " };
                    println!("{marker} {:>4}  #{}", channel.id, channel.name);
                }
            }
            Some("join") => {
                let target = sync.store().select(|s| {
                    s.channels
                        .iter()
                        .find(|c| c.name == arg.trim_start_matches('#') || c.id.to_string() == arg)
                        .map(|c| c.id)
                });
                match target {
                    Some(id) => sync.select_channel(id),
                    None => println!("no channel {arg}"),
                }
            }
            Some("create") if !arg.is_empty() => {
                report("create", sync.create_channel(arg).await);
            }
            Some("rename") if !arg.is_empty() => match current {
                Some(channel) if channel.removable => {
                    report("rename", sync.rename_channel(channel.id, arg).await);
                }
                Some(channel) => println!("#{} cannot be renamed", channel.name),
                None => println!("no channel selected"),
            },
            Some("remove") => match current {
                Some(channel) if channel.removable => {
                    report("remove", sync.remove_channel(channel.id).await);
                }
                Some(channel) => println!("#{} cannot be removed", channel.name),
                None => println!("no channel selected"),
            },
            Some("lang") => match arg.parse::<Language>() {
                Ok(language) => {
                    language.save(storage);
                    println!("language set to {}", language.name());
                }
                Err(e) => println!("{e}"),
            },
            Some("logout") => {
                session.logout();
                return Flow::Quit;
            }
            Some("quit") | Some("exit") => return Flow::Quit,
            Some(other) => println!("unknown command /{other}"),
        }
        Flow::Continue
    }

    fn report<T>(what: &str, result: Result<T, RequestFailure>) {
        if let Some(line) = failure_line(what, &result) {
            println!("{line}");
        }
    }

    fn failure_line<T>(what: &str, result: &Result<T, RequestFailure>) -> Option<String> {
        result
            .as_ref()
            .err()
            .map(|failure| format!("{what} failed: {}", failure.message()))
    }

    /// Echo the current channel and any messages not shown yet.
    async fn print_updates(store: ChatStore) {
        let mut revisions = store.subscribe();
        let mut shown_channel = None;
        let mut shown: HashSet<String> = HashSet::new();

        loop {
            store.select(|state| render(state, &mut shown_channel, &mut shown));
            if revisions.changed().await.is_err() {
                return;
            }
        }
    }

    fn render(state: &ChatState, shown_channel: &mut Option<i64>, shown: &mut HashSet<String>) {
        let Some(channel) = state.current_channel() else {
            return;
        };
        if *shown_channel != Some(channel.id) {
            *shown_channel = Some(channel.id);
            shown.clear();
            println!("== #{} ==", channel.name);
        }

        for (idx, message) in state.messages_in(channel.id).enumerate() {
            let key = match &message.id {
                Some(MessageId::Server(id)) => id.to_string(),
                Some(MessageId::Temporary(id)) => id.clone(),
                None => format!("#{idx}"),
            };
            if shown.insert(key) {
                let pending = if message.is_optimistic { " (sending)" } else { "" };
                println!("<{}> {}{}", message.username, message.body, pending);
            }
        }
    }

}
