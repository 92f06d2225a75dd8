use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;

use crate::common::{BackendCommand, BackendEvent, ChatMessage};
use crate::config::AppConfig;

use super::api::{DataApi, NewMessage};
use super::error::BackendError;
use super::realtime::{HEARTBEAT_INTERVAL, RealtimeSubscription};
use super::session::{AuthApi, AuthSession};

/// The backend half of the application: owns the HTTP clients, the
/// auth session, and the live subscription, and talks to the UI
/// exclusively through the command/event channels.
pub struct BackendClient {
    event_sender: mpsc::Sender<BackendEvent>,
    command_receiver: mpsc::Receiver<BackendCommand>,
    config: AppConfig,
    auth: AuthApi,
    data: DataApi,
    session: Option<AuthSession>,
    realtime: Option<RealtimeSubscription>,
}

impl BackendClient {
    pub fn new(
        event_sender: mpsc::Sender<BackendEvent>,
        command_receiver: mpsc::Receiver<BackendCommand>,
        config: AppConfig,
    ) -> Self {
        let http = reqwest::Client::new();
        let auth = AuthApi::new(http.clone(), &config.base_url, &config.anon_key);
        let data = DataApi::new(http, &config.base_url, &config.anon_key);

        Self {
            event_sender,
            command_receiver,
            config,
            auth,
            data,
            session: None,
            realtime: None,
        }
    }

    /// Event loop. Runs until the UI drops its command sender.
    pub async fn run(mut self) {
        log::info!("Backend event loop started against {}", self.config.base_url);

        let mut heartbeat = tokio::time::interval(HEARTBEAT_INTERVAL);
        heartbeat.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                command = self.command_receiver.recv() => {
                    match command {
                        Some(command) => self.handle_command(command).await,
                        None => break,
                    }
                }
                message = next_realtime_insert(&mut self.realtime) => {
                    match message {
                        Some(message) => {
                            self.emit(BackendEvent::MessageInserted(message)).await;
                        }
                        None => {
                            log::warn!("Realtime subscription ended");
                            self.realtime = None;
                        }
                    }
                }
                _ = heartbeat.tick(), if self.realtime.is_some() => {
                    self.heartbeat_tick().await;
                }
            }
        }

        if let Some(subscription) = self.realtime.take() {
            subscription.shutdown().await;
        }
    }

    async fn handle_command(&mut self, command: BackendCommand) {
        match command {
            BackendCommand::SignIn { email, password } => {
                match self.auth.sign_in(&email, &password).await {
                    Ok(token) => self.start_session(token).await,
                    Err(err) => {
                        log::warn!("Sign-in failed: {err}");
                        self.emit(BackendEvent::SignInFailed(err.to_string())).await;
                    }
                }
            }
            BackendCommand::SignUp {
                email,
                password,
                username,
            } => match self.auth.sign_up(&email, &password, &username).await {
                Ok(token) => self.start_session(token).await,
                Err(err) => {
                    log::warn!("Sign-up failed: {err}");
                    self.emit(BackendEvent::SignInFailed(err.to_string())).await;
                }
            },
            BackendCommand::SendMessage { content } => self.send_message(&content).await,
            BackendCommand::SignOut => self.sign_out().await,
        }
    }

    /// Everything that happens after the auth provider hands us a
    /// token: resolve the identity, load history, open the live
    /// subscription. History failure is surfaced to the UI; a failed
    /// subscription only costs us live updates and is just logged.
    async fn start_session(&mut self, access_token: String) {
        let user = match self.auth.fetch_user(&access_token).await {
            Ok(user) => user,
            Err(err) => {
                log::warn!("Identity fetch failed: {err}");
                self.emit(BackendEvent::SignInFailed(err.to_string())).await;
                return;
            }
        };

        self.session = Some(AuthSession {
            access_token: access_token.clone(),
            user: user.clone(),
        });
        self.emit(BackendEvent::SignedIn(user)).await;

        match self.data.fetch_messages(&access_token).await {
            Ok(messages) => self.emit(BackendEvent::HistoryLoaded(messages)).await,
            Err(err) => {
                log::warn!("History fetch failed: {err}");
                self.emit(BackendEvent::HistoryFetchFailed(err.to_string()))
                    .await;
            }
        }

        match RealtimeSubscription::connect(
            &self.config.base_url,
            &self.config.anon_key,
            &access_token,
        )
        .await
        {
            Ok(subscription) => self.realtime = Some(subscription),
            Err(err) => log::warn!("Realtime subscription failed: {err}"),
        }
    }

    async fn send_message(&self, content: &str) {
        let Some(session) = &self.session else {
            self.emit(BackendEvent::MessageSendFailed(
                BackendError::MissingSession.to_string(),
            ))
            .await;
            return;
        };

        let message = NewMessage {
            content,
            user_id: &session.user.id,
            username: &session.user.username,
        };

        match self.data.insert_message(&session.access_token, message).await {
            Ok(()) => self.emit(BackendEvent::MessageSent).await,
            Err(err) => {
                log::warn!("Message insert failed: {err}");
                self.emit(BackendEvent::MessageSendFailed(err.to_string()))
                    .await;
            }
        }
    }

    async fn sign_out(&mut self) {
        if let Some(subscription) = self.realtime.take() {
            subscription.shutdown().await;
        }

        if let Some(session) = self.session.take() {
            // The local session is discarded either way.
            if let Err(err) = self.auth.sign_out(&session.access_token).await {
                log::warn!("Sign-out call failed: {err}");
            }
        }

        self.emit(BackendEvent::SignedOut).await;
    }

    async fn heartbeat_tick(&mut self) {
        let Some(subscription) = self.realtime.as_mut() else {
            return;
        };
        if let Err(err) = subscription.send_heartbeat().await {
            log::warn!("Realtime heartbeat failed: {err}");
            self.realtime = None;
        }
    }

    async fn emit(&self, event: BackendEvent) {
        if let Err(err) = self.event_sender.send(event).await {
            log::warn!("Failed to notify UI: {err}");
        }
    }
}

/// Select-friendly wrapper: with no subscription there is nothing to
/// wake up for, so park forever instead of resolving.
async fn next_realtime_insert(
    realtime: &mut Option<RealtimeSubscription>,
) -> Option<ChatMessage> {
    match realtime {
        Some(subscription) => subscription.next_insert().await,
        None => std::future::pending().await,
    }
}
