use crate::config::{ApiAuth, Config, FetchSettings, MailProvider, StoreSettings};
use crate::db::{Database, SqliteSnapshotStore};
use crate::fetcher::{CaseApiClient, CaseStatusPage, Fetcher, LoginCommand, Session, StaticCookie};
use crate::mailer::{BrevoMailer, Notifier, ResendMailer};
use crate::orchestrator::Orchestrator;
use crate::router::handle;
use crate::scheduler::{listen_for_shutdown, Scheduler};
use crate::status_board::StatusBoard;
use crate::store::{FileSnapshotStore, SnapshotStore};
use astra::Server;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod db;
mod domain;
mod errors;
mod fetcher;
mod mailer;
mod orchestrator;
mod responses;
mod router;
mod scheduler;
mod status_board;
mod store;
mod templates;

#[cfg(test)]
mod tests;

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "case_tracker=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("case tracker starting");

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "failed to load configuration");
            std::process::exit(1);
        }
    };
    config.log_summary();

    // Mail first, so a failed login at startup can still be reported.
    let notifier = match build_notifier(&config) {
        Ok(notifier) => notifier,
        Err(e) => {
            error!(error = %e, "failed to create mailer");
            std::process::exit(1);
        }
    };

    let fetcher = match build_fetcher(&config) {
        Ok(fetcher) => fetcher,
        Err(e) => {
            error!(error = %e, "failed to create case fetcher");
            if e.is_auth_failure() {
                let alert = domain::policy::auth_alert("startup login", &e.to_string());
                if let Err(send_err) =
                    notifier.send(&config.recipient_email, &alert.subject, &alert.html_body)
                {
                    error!(error = %send_err, "failed to send authentication alert");
                }
            }
            std::process::exit(1);
        }
    };

    let store = match build_store(&config) {
        Ok(store) => store,
        Err(e) => {
            error!(error = %e, "failed to open snapshot store");
            std::process::exit(1);
        }
    };

    let orchestrator = Arc::new(Orchestrator::new(
        fetcher,
        notifier,
        store,
        config.recipient_email.clone(),
    ));
    let board = StatusBoard::default();

    if config.port != 0 {
        spawn_health_server(config.port, board.clone());
    }

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(e) => {
            error!(error = %e, "failed to start runtime");
            std::process::exit(1);
        }
    };

    let scheduler = Scheduler::new(
        Arc::clone(&orchestrator),
        config.case_ids.clone(),
        config.poll_interval,
        board,
    );

    let result = runtime.block_on(async move {
        let (tx, rx) = tokio::sync::watch::channel(false);
        tokio::spawn(listen_for_shutdown(tx));
        scheduler.run(rx).await
    });

    // The runtime goes first; blocking HTTP clients panic if dropped inside it.
    drop(runtime);
    orchestrator.fetcher().close();

    if let Err(e) = result {
        error!(error = %e, "case tracker stopped");
        std::process::exit(1);
    }

    info!("case tracker shut down cleanly");
}

fn build_notifier(config: &Config) -> Result<Box<dyn Notifier>, mailer::MailerError> {
    let mail = &config.mail;
    let notifier: Box<dyn Notifier> = match mail.provider {
        MailProvider::Resend => Box::new(ResendMailer::new(
            mail.api_key.clone(),
            format!("{} <{}>", mail.from_name, mail.from),
        )?),
        MailProvider::Brevo => Box::new(BrevoMailer::new(
            mail.api_key.clone(),
            mail.from.clone(),
            mail.from_name.clone(),
        )?),
    };
    Ok(notifier)
}

fn build_fetcher(config: &Config) -> Result<Box<dyn Fetcher>, fetcher::FetchError> {
    let fetcher: Box<dyn Fetcher> = match &config.fetch {
        FetchSettings::Api { base_url, auth } => {
            let session: Box<dyn Session> = match auth {
                ApiAuth::Cookie(cookie) => Box::new(StaticCookie::new(cookie.clone())),
                ApiAuth::LoginCommand(command) => Box::new(LoginCommand::start(command.clone())?),
            };
            Box::new(CaseApiClient::new(base_url, session)?)
        }
        FetchSettings::Page { url_template } => Box::new(CaseStatusPage::new(url_template.clone())?),
    };
    Ok(fetcher)
}

fn build_store(config: &Config) -> Result<Box<dyn SnapshotStore>, errors::StoreError> {
    let store: Box<dyn SnapshotStore> = match &config.store {
        StoreSettings::File { dir } => Box::new(FileSnapshotStore::new(dir.clone())?),
        StoreSettings::Sqlite { path } => {
            Box::new(SqliteSnapshotStore::open(Database::new(path.clone()))?)
        }
    };
    Ok(store)
}

fn spawn_health_server(port: u16, board: StatusBoard) {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(%addr, "starting health server");

    std::thread::spawn(move || {
        let server = Server::bind(&addr).max_workers(4);
        let result = server.serve(move |req, _info| match handle(req, &board) {
            Ok(resp) => resp,
            Err(err) => responses::error_to_response(err),
        });

        if let Err(e) = result {
            error!(error = %e, "health server stopped");
        }
    });
}
