use clap::{Parser, Subcommand};
use codebites_client::{
    api::HttpUsersApi,
    form::{Field, FormEvent, FormKind, FormSession, Mount},
    notify::{Notifier, TokioScheduler},
    views, App, Error,
};
use codebites_core::{init_tracing, FileTokenStore, CONFIG};
use std::sync::Arc;
use tracing::debug;

/// Command-line client for the Code Bites users and questions service.
#[derive(Parser)]
#[command(name = "codebites", version, about)]
struct Cli {
    /// Base URL of the users service; overrides `services.users.url`.
    #[arg(long)]
    url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create an account and sign in.
    Register {
        #[arg(long, default_value = "")]
        username: String,
        #[arg(long, default_value = "")]
        email: String,
        #[arg(long, default_value = "")]
        password: String,
    },
    /// Sign in with an existing account.
    Login {
        #[arg(long, default_value = "")]
        email: String,
        #[arg(long, default_value = "")]
        password: String,
    },
    /// Forget the stored session.
    Signout,
    /// List all users.
    Users,
    /// Show the signed-in user.
    Me,
    /// List all questions.
    Questions,
    /// Show the validation rules of a form.
    Rules {
        #[arg(default_value = "register")]
        kind: FormKind,
    },
}

type ClientApp = App<HttpUsersApi, FileTokenStore>;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Error> {
    main_inner().await
}

// `main_inner` is a separate function from `main` because rust doesn't provide
// helpful messages for errors originating in a method annotated with `#[tokio::main]`.
async fn main_inner() -> Result<(), Error> {
    better_panic::install();
    init_tracing("codebites_client");

    let cli = Cli::parse();
    let url = match cli.url {
        Some(url) => url,
        None => CONFIG.users_service_url()?,
    };
    debug!("using users service at {}", url);

    let api = HttpUsersApi::new(&url)?;
    let store = FileTokenStore::new(CONFIG.token_path());
    let mut app = App::new(api, store, Notifier::new(Arc::new(TokioScheduler)));

    match cli.command {
        Command::Register {
            username,
            email,
            password,
        } => {
            let fields = vec![
                (Field::Username, username),
                (Field::Email, email),
                (Field::Password, password),
            ];
            submit_form(&mut app, FormKind::Register, fields).await?
        }
        Command::Login { email, password } => {
            let fields = vec![(Field::Email, email), (Field::Password, password)];
            submit_form(&mut app, FormKind::Login, fields).await?
        }
        Command::Signout => {
            app.signout_user().await;
            println!("{}", views::signed_out());
        }
        Command::Users => {
            app.refresh_users().await;
            println!("{}", views::users(&app.users()));
        }
        Command::Me => match app.current_user().await? {
            Some(user) => println!("{}", views::profile(&user)),
            None => println!("{}", views::login_required()),
        },
        Command::Questions => match app.questions().await? {
            Some(questions) => println!("{}", views::questions(&questions)),
            None => println!("{}", views::login_required()),
        },
        Command::Rules { kind } => {
            let form = FormSession::new(kind);
            println!("{}\n{}", kind.title(), views::rules(&form));
        }
    }

    Ok(())
}

async fn submit_form(
    app: &mut ClientApp,
    kind: FormKind,
    fields: Vec<(Field, String)>,
) -> Result<(), Error> {
    let mut form = match app.mount_form(kind) {
        Mount::Redirect(route) => {
            println!("Already signed in, redirecting to {}.", route.path());
            app.refresh_users().await;
            println!("{}", views::users(&app.users()));
            return Ok(());
        }
        Mount::Form(form) => form,
    };

    for (field, value) in fields {
        form = form.reduce(FormEvent::FieldChanged { field, value })?;
    }
    println!("{}\n", views::form(&form));

    if !form.can_submit() {
        // Nothing was sent; the rule list above says why.
        return Ok(());
    }

    let form: FormSession = app.submit(&form).await?;
    if let Some(message) = app.message() {
        println!("{}", views::message(&message));
    }
    if form.is_authenticated() {
        app.users_refreshed().await;
        println!("{}", views::users(&app.users()));
    }
    Ok(())
}
