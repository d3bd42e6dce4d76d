mod dashboard_flow;
mod snapshot_backup;
