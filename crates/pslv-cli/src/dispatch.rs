use color_eyre::Result;
use pslv_core::api;
use pslv_core::{
    AccessEditRequest, AccessListRequest, AdminAddRequest, AdminUpdateRequest, CommandContext,
    CommandGroup, CommandInfo, InstallRequest, LaunchRequest, UninstallRequest, UpdateRequest,
};

use crate::cli::{
    AccessCommand, AccessEditArgs, AdminAddArgs, AdminCommand, AdminUpdateArgs, CommandGroupCli,
};

pub fn dispatch_command(
    ctx: &CommandContext,
    group: &CommandGroupCli,
) -> Result<(CommandInfo, pslv_core::ExecutionOutcome)> {
    match group {
        CommandGroupCli::Sync => {
            let info = CommandInfo::new(CommandGroup::Sync, "sync");
            core_call(info, || api::catalog_sync(ctx))
        }
        CommandGroupCli::List => {
            let info = CommandInfo::new(CommandGroup::List, "list");
            core_call(info, || api::catalog_list(ctx))
        }
        CommandGroupCli::Info(args) => {
            let info = CommandInfo::new(CommandGroup::Info, "info");
            core_call(info, || api::catalog_info(ctx, &args.name))
        }
        CommandGroupCli::Install(args) => {
            let info = CommandInfo::new(CommandGroup::Install, "install");
            let request = InstallRequest {
                name: args.name.clone(),
            };
            core_call(info, || api::solution_install(ctx, &request))
        }
        CommandGroupCli::Update(args) => {
            let info = CommandInfo::new(CommandGroup::Update, "update");
            let request = UpdateRequest {
                name: args.name.clone(),
            };
            core_call(info, || api::solution_update(ctx, &request))
        }
        CommandGroupCli::Uninstall(args) => {
            let info = CommandInfo::new(CommandGroup::Uninstall, "uninstall");
            let request = UninstallRequest {
                name: args.name.clone(),
                yes: args.yes,
            };
            core_call(info, || api::solution_uninstall(ctx, &request))
        }
        CommandGroupCli::Launch(args) => {
            let info = CommandInfo::new(CommandGroup::Launch, "launch");
            let request = LaunchRequest {
                name: args.name.clone(),
            };
            core_call(info, || api::solution_launch(ctx, &request))
        }
        CommandGroupCli::Admin(cmd) => match cmd {
            AdminCommand::Check => {
                let info = CommandInfo::new(CommandGroup::Admin, "check");
                core_call(info, || api::admin_check(ctx))
            }
            AdminCommand::Add(args) => {
                let info = CommandInfo::new(CommandGroup::Admin, "add");
                let request = admin_add_request_from_args(args);
                core_call(info, || api::admin_add(ctx, &request))
            }
            AdminCommand::Update(args) => {
                let info = CommandInfo::new(CommandGroup::Admin, "update");
                let request = admin_update_request_from_args(args);
                core_call(info, || api::admin_update(ctx, &request))
            }
        },
        CommandGroupCli::Access(cmd) => match cmd {
            AccessCommand::List(args) => {
                let info = CommandInfo::new(CommandGroup::Access, "list");
                let request = AccessListRequest {
                    name: args.name.clone(),
                };
                core_call(info, || api::access_list(ctx, &request))
            }
            AccessCommand::Grant(args) => {
                let info = CommandInfo::new(CommandGroup::Access, "grant");
                let request = access_edit_request_from_args(args);
                core_call(info, || api::access_grant(ctx, &request))
            }
            AccessCommand::Revoke(args) => {
                let info = CommandInfo::new(CommandGroup::Access, "revoke");
                let request = access_edit_request_from_args(args);
                core_call(info, || api::access_revoke(ctx, &request))
            }
        },
        CommandGroupCli::Whoami => {
            let info = CommandInfo::new(CommandGroup::Whoami, "whoami");
            core_call(info, || api::user_whoami(ctx))
        }
    }
}

fn core_call(
    info: CommandInfo,
    call: impl FnOnce() -> anyhow::Result<pslv_core::ExecutionOutcome>,
) -> Result<(CommandInfo, pslv_core::ExecutionOutcome)> {
    let outcome = call().map_err(|err| color_eyre::eyre::eyre!("{err:?}"))?;
    Ok((info, outcome))
}

fn access_edit_request_from_args(args: &AccessEditArgs) -> AccessEditRequest {
    AccessEditRequest {
        name: args.name.clone(),
        sid: args.sid.clone(),
    }
}

fn admin_add_request_from_args(args: &AdminAddArgs) -> AdminAddRequest {
    AdminAddRequest {
        name: args.name.clone(),
        description: args.description.clone(),
        executable_location: args.executable_location.clone(),
        environment: args.environment.clone(),
        release_date: args.release_date.clone(),
        validity_period_days: args.validity_period_days.clone(),
        version_number: args.version_number.clone(),
        registration_id: args.registration_id.clone(),
        access: args.access.clone(),
    }
}

fn admin_update_request_from_args(args: &AdminUpdateArgs) -> AdminUpdateRequest {
    AdminUpdateRequest {
        name: args.name.clone(),
        description: args.description.clone(),
        executable_location: args.executable_location.clone(),
        environment: args.environment.clone(),
        release_date: args.release_date.clone(),
        validity_period_days: args.validity_period_days.clone(),
        version_number: args.version_number.clone(),
        registration_id: args.registration_id.clone(),
    }
}
