//! Show the Notion identity behind the connected account and its recent pages.
//!
//! Requires `COMPOSIO_API_KEY` and `NOTION_CONNECTED_ACCOUNT_ID` (or a secret
//! store, see `CredentialLoader`).
//!
//! Run with: cargo run --example notion_me

use composio_sdk::{ComposioClient, ComposioResult, SearchFilter};

#[tokio::main]
async fn main() -> ComposioResult<()> {
    tracing_subscriber::fmt::init();

    let client = ComposioClient::from_env().await?;
    let notion = client.notion()?;

    let me = notion.get_current_user().await?;
    println!("Connected as {} ({})", me.name.as_deref().unwrap_or("unnamed"), me.id);

    println!("\nUsers in workspace:");
    for user in notion.list_users().await? {
        println!(
            "  {} <{}>",
            user.name.as_deref().unwrap_or("-"),
            user.email.as_deref().unwrap_or("no email")
        );
    }

    println!("\nPages:");
    let pages = notion
        .search_workspace("", Some(SearchFilter::Page), 10)
        .await?;
    for page in pages {
        println!(
            "  {}  {}",
            page.id,
            page.title.as_deref().unwrap_or("Untitled")
        );
    }

    Ok(())
}
