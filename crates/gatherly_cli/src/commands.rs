//! CLI commands.

use clap::{Args, Parser, Subcommand};
use gatherly_core::db::open_db;
use gatherly_core::{
    init_logging, CoreConfig, CreateEventRequest, EventService, NewOrganization, NewUser,
    OrganizationService, SqliteEventRepository, SqliteOrganizationRepository,
    SqliteUserRepository, UserService, EVENT_NOT_FOUND, ORGANIZATION_NOT_FOUND, USER_NOT_FOUND,
};
use log::debug;
use rusqlite::Connection;
use serde::Serialize;
use std::path::PathBuf;
use uuid::Uuid;

use crate::error::CliError;

/// Gatherly - manage community organizations and their events.
#[derive(Debug, Parser)]
#[command(name = "gatherly")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// SQLite database file. Overrides `GATHERLY_DB_PATH`.
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Manage users.
    #[command(subcommand)]
    User(UserCommand),

    /// Manage organizations.
    #[command(subcommand)]
    Org(OrgCommand),

    /// Manage events.
    #[command(subcommand)]
    Event(EventCommand),
}

#[derive(Debug, Subcommand)]
enum UserCommand {
    /// Register a new user.
    Register(RegisterUserArgs),

    /// Show one user with its organization and event links.
    Get {
        /// User id.
        id: Uuid,
    },
}

#[derive(Debug, Args)]
struct RegisterUserArgs {
    #[arg(long)]
    email: String,

    #[arg(long)]
    first_name: String,

    #[arg(long)]
    last_name: String,

    /// Two-letter application language code.
    #[arg(long)]
    language: Option<String>,
}

#[derive(Debug, Subcommand)]
enum OrgCommand {
    /// Create an organization owned by the `--as` user.
    Create(CreateOrgArgs),

    /// Show one organization.
    Get {
        /// Organization id.
        id: Uuid,
    },

    /// Join an organization as a member.
    Join {
        /// Joining user id.
        #[arg(long = "as")]
        user: Uuid,

        /// Organization id.
        organization: Uuid,
    },

    /// Promote an existing member to admin.
    AddAdmin {
        /// Requesting admin id.
        #[arg(long = "as")]
        requester: Uuid,

        /// Organization id.
        organization: Uuid,

        /// Member to promote.
        user: Uuid,
    },
}

#[derive(Debug, Args)]
struct CreateOrgArgs {
    /// Creating user id.
    #[arg(long = "as")]
    creator: Uuid,

    #[arg(long)]
    name: String,

    #[arg(long, default_value = "")]
    description: String,

    /// Hide the organization from open joins.
    #[arg(long)]
    private: bool,
}

#[derive(Debug, Subcommand)]
enum EventCommand {
    /// Create an event from a `createEvent` JSON payload.
    Create {
        /// Requesting user id.
        #[arg(long = "as")]
        requester: Uuid,

        /// Payload of the form `{"data": {"organizationId": ..., ...}}`.
        #[arg(long)]
        data: String,
    },

    /// Show one event.
    Get {
        /// Event id.
        id: Uuid,
    },

    /// List events of one organization, oldest first.
    List {
        /// Organization id.
        organization: Uuid,
    },
}

impl Cli {
    /// Runs the parsed command and prints its JSON result.
    pub fn run(self) -> Result<(), CliError> {
        let mut config = CoreConfig::from_env()?;
        if let Some(db) = self.db {
            config.db_path = db;
        }
        if let Some(log_dir) = &config.log_dir {
            init_logging(config.log_level, &log_dir.to_string_lossy())?;
        }
        debug!("event=cli_start module=cli status=ok");

        let conn = open_db(&config.db_path)?;
        match self.command {
            Commands::User(command) => command.run(&conn),
            Commands::Org(command) => command.run(&conn),
            Commands::Event(command) => command.run(&conn),
        }
    }
}

impl UserCommand {
    fn run(self, conn: &Connection) -> Result<(), CliError> {
        let service = UserService::new(SqliteUserRepository::try_new(conn)?);
        match self {
            Self::Register(args) => {
                let mut user = NewUser::new(args.email, args.first_name, args.last_name);
                user.app_language_code = args.language;
                print_json(&service.register_user(&user)?)
            }
            Self::Get { id } => match service.get_user(id)? {
                Some(user) => print_json(&user),
                None => Err(CliError::new(USER_NOT_FOUND, format!("user {id} not found"))),
            },
        }
    }
}

impl OrgCommand {
    fn run(self, conn: &Connection) -> Result<(), CliError> {
        let service = OrganizationService::new(
            SqliteUserRepository::try_new(conn)?,
            SqliteOrganizationRepository::try_new(conn)?,
        );
        let organization = match self {
            Self::Create(args) => service.create_organization(
                args.creator,
                &NewOrganization {
                    name: args.name,
                    description: args.description,
                    is_public: !args.private,
                },
            )?,
            Self::Get { id } => service.get_organization(id)?.ok_or_else(|| {
                CliError::new(
                    ORGANIZATION_NOT_FOUND,
                    format!("organization {id} not found"),
                )
            })?,
            Self::Join { user, organization } => service.join_organization(user, organization)?,
            Self::AddAdmin {
                requester,
                organization,
                user,
            } => service.add_admin(requester, organization, user)?,
        };
        print_json(&organization)
    }
}

impl EventCommand {
    fn run(self, conn: &Connection) -> Result<(), CliError> {
        let service = EventService::new(
            SqliteUserRepository::try_new(conn)?,
            SqliteOrganizationRepository::try_new(conn)?,
            SqliteEventRepository::try_new(conn)?,
        );
        match self {
            Self::Create { requester, data } => {
                let request: CreateEventRequest = serde_json::from_str(&data)?;
                print_json(&service.create_event(requester, &request)?)
            }
            Self::Get { id } => match service.get_event(id)? {
                Some(event) => print_json(&event),
                None => Err(CliError::new(
                    EVENT_NOT_FOUND,
                    format!("event {id} not found"),
                )),
            },
            Self::List { organization } => {
                print_json(&service.list_organization_events(organization)?)
            }
        }
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
