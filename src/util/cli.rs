use clap::Parser;

use crate::core::models::Client;
use crate::core::types::{ClientId, ClientSecret, GrantType, HashedClientSecret, RedirectUri};
use crate::util::hash::HashingService;
use crate::util::random::OpaqueGenerator;

#[derive(Parser)]
#[clap(
    name = "sekimori-util",
    version = env!("CARGO_PKG_VERSION"),
    author = env!("CARGO_PKG_AUTHORS")
)]
pub struct Options {
    #[clap(env = "HASH_SECRET")]
    hash_secret: String,
    #[clap(subcommand)]
    command: SubCommand,
}

#[derive(Parser)]
enum SubCommand {
    /// Print a client registration for the clients file
    CreateClient(CreateClient),
    /// Hash a client secret with the configured server key
    HashSecret(HashSecret),
    /// Generate a fresh client secret
    GenerateSecret(GenerateSecret),
}

#[derive(Parser)]
struct CreateClient {
    #[clap(short, long)]
    id: ClientId,
    #[clap(short, long)]
    name: String,
    #[clap(short, long)]
    secret: String,
    #[clap(short = 'u', long = "redirect-uri")]
    redirect_uris: Vec<RedirectUri>,
    #[clap(short = 'g', long = "grant-type")]
    grant_types: Vec<GrantType>,
}

#[derive(Parser)]
struct HashSecret {
    #[clap(short, long)]
    secret: String,
}

#[derive(Parser)]
struct GenerateSecret;

fn get_hasher(secret: &str) -> HashingService {
    HashingService::with_secret_key(secret.to_string())
}

fn create_client(c: &CreateClient, opts: &Options) {
    for uri in &c.redirect_uris {
        if !uri.is_valid() {
            eprintln!("Bad redirect URI: {}", uri.0);
            std::process::exit(1);
        }
    }

    let hasher = get_hasher(&opts.hash_secret);
    let secret = hasher
        .hash(&ClientSecret(c.secret.to_string()))
        .expect("Failed to hash secret");

    let client = Client {
        id: c.id.clone(),
        name: c.name.to_string(),
        secret,
        redirect_uris: c.redirect_uris.iter().cloned().collect(),
        grant_types: c.grant_types.iter().copied().collect(),
    };

    let entry = serde_json::to_string_pretty(&client).expect("Failed to serialize client");
    println!("{}", entry);
}

fn hash_secret(c: &HashSecret, opts: &Options) {
    let hasher = get_hasher(&opts.hash_secret);
    let hashed: HashedClientSecret = hasher
        .hash(&ClientSecret(c.secret.to_string()))
        .expect("Failed to hash secret");
    println!("{}", hashed.0);
}

fn generate_secret(_c: &GenerateSecret) {
    let generator = OpaqueGenerator::default();
    println!("{}", generator.client_secret().0);
}

pub fn run_cli_action(opts: Options) {
    use SubCommand::*;

    match &opts.command {
        CreateClient(c) => create_client(c, &opts),
        HashSecret(c) => hash_secret(c, &opts),
        GenerateSecret(c) => generate_secret(c),
    };
}
