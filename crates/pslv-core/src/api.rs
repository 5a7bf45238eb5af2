// Intended public API surface for `pslv-core`.
//
// This module exists to keep the crate root small and make it explicit which
// types/functions are part of the stable interface used by the CLI and other
// crates.

pub use crate::core::actions::{ensure_user_registered, record_action};
pub use crate::core::commands::access::{
    access_grant, access_list, access_revoke, AccessEditRequest, AccessListRequest,
};
pub use crate::core::commands::admin::{
    admin_add, admin_check, admin_update, AdminAddRequest, AdminUpdateRequest,
};
pub use crate::core::commands::catalog::{catalog_info, catalog_list, catalog_sync};
pub use crate::core::commands::install::{
    solution_install, solution_launch, solution_uninstall, solution_update, InstallRequest,
    LaunchRequest, UninstallRequest, UpdateRequest,
};
pub use crate::core::commands::user::user_whoami;
pub use crate::core::config::context::{CommandContext, CommandInfo};
pub use crate::core::config::{
    Config, GlobalOptions, ListNames, NetworkConfig, PathsConfig, UserIdentity,
};
pub use crate::core::effects::{Effects, Launcher, ListService, SharedEffects, SystemEffects};
pub use crate::core::list::HttpListService;
pub use crate::core::sync::{
    sync_catalog, SilentProgress, SyncOutcome, SyncProgress, SyncRequest, SyncSource,
};
pub use crate::core::tooling::outcome::{CommandStatus, ExecutionOutcome, UserFriendlyError};
pub use crate::core::tooling::progress::ProgressReporter;
pub use crate::core::tooling::response::{format_status_message, to_json_response, CommandGroup};
pub use crate::core::transfer::{ChunkedCopy, TransferError, CHUNK_SIZE};
pub use crate::core::worker::{spawn_worker, with_retry, WorkerEvent, WorkerHandle, WorkerScope};
