//! Channel information example.
//!
//! This example looks up a user by login, prints their channel metadata and
//! the first page of their followers.
//!
//! Run with: cargo run --example channel_info -- twitchdev

use twitch_helix_rs::api::FollowsQuery;
use twitch_helix_rs::{Environment, HelixClient};

#[tokio::main]
async fn main() -> twitch_helix_rs::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    // Get credentials from environment variables
    let client_id = std::env::var("TWITCH_CLIENT_ID")
        .expect("TWITCH_CLIENT_ID environment variable required");
    let access_token = std::env::var("TWITCH_ACCESS_TOKEN")
        .expect("TWITCH_ACCESS_TOKEN environment variable required");
    let login = std::env::args().nth(1).unwrap_or_else(|| "twitchdev".to_string());

    let client = HelixClient::from_token(client_id, access_token, Environment::Production)?;

    match client.auth().validate_access_token(None).await? {
        Some(info) => println!(
            "Token valid for {}s, scopes: {}",
            info.expires_in,
            info.scopes.join(" ")
        ),
        None => {
            println!("Access token was rejected");
            return Ok(());
        }
    }

    let users = client.users().get_by_logins(&[login.as_str()]).await?;
    let Some(user) = users.first() else {
        println!("No user named {}", login);
        return Ok(());
    };
    println!("\n{} ({})", user.display_name, user.id);

    if let Some(channel) = client.channels().get(&user.id).await? {
        println!("  Title:    {}", channel.title);
        println!("  Language: {}", channel.broadcaster_language);
        if channel.has_game() {
            println!("  Game:     {}", channel.game_name);
        }
    }

    let follows = client
        .users()
        .get_follows(&FollowsQuery::to(user.id.as_str()).first(10))
        .await?;
    println!(
        "\nLatest followers ({} total):",
        follows.total.map(|t| t.to_string()).unwrap_or_else(|| "?".to_string())
    );
    for follow in &follows.follows {
        println!("  - {} at {}", follow.from_name, follow.followed_at);
    }

    println!("\nDone!");
    Ok(())
}
