use tracing::debug;

use crate::error::Result;
use crate::lifecycle::Lifecycle;

pub async fn run(lc: &mut Lifecycle<'_>) -> Result<()> {
    let listing = lc.client().discover(lc.session()).await?;
    debug!(categories = ?listing.categories(), "query interface");

    let count = listing.categories().len();
    lc.check(count > 0, || {
        format!("query interface lists at least one category, got {}", count)
    })
}
