use clap::{ArgAction, Args, Parser, Subcommand};

pub const PSLV_HELP_TEMPLATE: &str =
    "{before-help}\nUsage:\n    {usage}\n\nGlobal options:\n{options}\n";

pub const PSLV_BEFORE_HELP: &str = concat!(
    "pslv ",
    env!("CARGO_PKG_VERSION"),
    " – Solution Launcher for VDI\n\n",
    "\x1b[1;36mEveryday workflow\x1b[0m\n",
    "  sync             Refresh the catalog from the list service (snapshot fallback).\n",
    "  list             Show the applications you can access and their state.\n",
    "  info             Registration, release, and validity details for one entry.\n",
    "  install / update Copy the executable from the shared location, track its version.\n",
    "  launch           Start an installed, unexpired application.\n",
    "  uninstall        Remove an installed application (asks for --yes).\n\n",
    "\x1b[1;36mAdministration\x1b[0m\n",
    "  admin            Check privileges, add or edit catalog entries.\n",
    "  access           Manage per-entry access lists.\n",
    "  whoami           Your userbase record (registers you on first sight).\n",
);

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    propagate_version = false,
    disable_help_subcommand = true,
    before_help = PSLV_BEFORE_HELP,
    help_template = PSLV_HELP_TEMPLATE
)]
pub struct PslvCli {
    #[arg(
        short,
        long,
        help = "Suppress human output (errors still print to stderr)",
        global = true
    )]
    pub quiet: bool,
    #[arg(short, long, action = ArgAction::Count, help = "Increase logging (-vv reaches trace)")]
    pub verbose: u8,
    #[arg(long, help = "Force trace logging regardless of -v/-q", global = true)]
    pub trace: bool,
    #[arg(
        long,
        help = "Emit {status,message,details} JSON envelopes",
        global = true
    )]
    pub json: bool,
    #[arg(long, help = "Disable colored human output", global = true)]
    pub no_color: bool,
    #[arg(
        long,
        help = "Skip the list service for this invocation (sets PSLV_ONLINE=0)",
        global = true
    )]
    pub offline: bool,
    #[command(subcommand)]
    pub command: CommandGroupCli,
}

#[derive(Subcommand, Debug)]
pub enum CommandGroupCli {
    #[command(
        about = "Refresh the catalog: remote fetch, snapshot fallback, never fails.",
        after_help = "Examples:\n  pslv sync\n  pslv --json sync\n  pslv --offline sync\n"
    )]
    Sync,
    #[command(
        about = "List visible applications with their tile state (expired entries last).",
        after_help = "Examples:\n  pslv list\n  pslv --json list\n"
    )]
    List,
    #[command(
        about = "Show registration, release date, and validity for one application.",
        override_usage = "pslv info <NAME>"
    )]
    Info(NameArgs),
    #[command(
        about = "Install an application from its shared location (1 KiB chunked copy).",
        override_usage = "pslv install <NAME>"
    )]
    Install(NameArgs),
    #[command(
        about = "Reinstall an application whose catalog version is newer than yours.",
        override_usage = "pslv update <NAME>"
    )]
    Update(NameArgs),
    #[command(
        about = "Remove an installed application and its version marker.",
        override_usage = "pslv uninstall <NAME> --yes"
    )]
    Uninstall(UninstallArgs),
    #[command(
        about = "Launch an installed, unexpired application.",
        override_usage = "pslv launch <NAME>"
    )]
    Launch(NameArgs),
    #[command(
        about = "Administrator commands for the catalog.",
        override_usage = "pslv admin <check|add|update>",
        subcommand
    )]
    Admin(AdminCommand),
    #[command(
        about = "Manage who can see a catalog entry.",
        override_usage = "pslv access <list|grant|revoke>",
        subcommand
    )]
    Access(AccessCommand),
    #[command(about = "Show your userbase record, registering you on first sight.")]
    Whoami,
}

#[derive(Subcommand, Debug)]
pub enum AdminCommand {
    #[command(about = "Report whether you administer any line of business.")]
    Check,
    #[command(
        about = "Add a catalog entry.",
        override_usage = "pslv admin add <NAME> --executable-location PATH [--environment ENV] ..."
    )]
    Add(AdminAddArgs),
    #[command(
        about = "Update fields of an existing catalog entry.",
        override_usage = "pslv admin update <NAME> [--version-number V] ..."
    )]
    Update(AdminUpdateArgs),
}

#[derive(Subcommand, Debug)]
pub enum AccessCommand {
    #[command(about = "Show an entry's access list.")]
    List(NameArgs),
    #[command(about = "Grant a user id access to an entry.")]
    Grant(AccessEditArgs),
    #[command(about = "Revoke a user id's direct access to an entry.")]
    Revoke(AccessEditArgs),
}

#[derive(Args, Debug)]
pub struct NameArgs {
    #[arg(value_name = "NAME", help = "Catalog entry name (case-insensitive)")]
    pub name: String,
}

#[derive(Args, Debug)]
pub struct UninstallArgs {
    #[arg(value_name = "NAME")]
    pub name: String,
    #[arg(long, help = "Confirm removing the install directory")]
    pub yes: bool,
}

#[derive(Args, Debug)]
pub struct AccessEditArgs {
    #[arg(value_name = "NAME")]
    pub name: String,
    #[arg(value_name = "SID", help = "User id to grant or revoke")]
    pub sid: String,
}

#[derive(Args, Debug)]
pub struct AdminAddArgs {
    #[arg(value_name = "NAME")]
    pub name: String,
    #[arg(long, default_value = "")]
    pub description: String,
    #[arg(long, value_name = "PATH")]
    pub executable_location: String,
    #[arg(long, value_name = "ENV", default_value = "BETA")]
    pub environment: String,
    #[arg(long, value_name = "DATE", default_value = "", help = "Release date, YYYY-MM-DD")]
    pub release_date: String,
    #[arg(long, value_name = "DAYS", default_value = "")]
    pub validity_period_days: String,
    #[arg(long, value_name = "VERSION")]
    pub version_number: Option<String>,
    #[arg(long, value_name = "ID")]
    pub registration_id: Option<String>,
    #[arg(
        long,
        default_value = "",
        help = "Semicolon-separated user ids, or 'everyone'"
    )]
    pub access: String,
}

#[derive(Args, Debug)]
pub struct AdminUpdateArgs {
    #[arg(value_name = "NAME")]
    pub name: String,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long, value_name = "PATH")]
    pub executable_location: Option<String>,
    #[arg(long, value_name = "ENV")]
    pub environment: Option<String>,
    #[arg(long, value_name = "DATE")]
    pub release_date: Option<String>,
    #[arg(long, value_name = "DAYS")]
    pub validity_period_days: Option<String>,
    #[arg(long, value_name = "VERSION")]
    pub version_number: Option<String>,
    #[arg(long, value_name = "ID")]
    pub registration_id: Option<String>,
}
