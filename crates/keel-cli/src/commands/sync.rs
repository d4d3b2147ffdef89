use crate::commands::common::{sync_all, AppContext};
use crate::error::CliError;

pub async fn run_sync(context: &AppContext, bootstrap: bool) -> Result<(), CliError> {
    let reports = sync_all(context, bootstrap).await?;
    for report in &reports {
        println!("{}", report.line());
    }
    Ok(())
}
