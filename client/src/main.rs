use clap::Parser;
use client::network::{Client, SessionMode};
use log::info;
use macroquad::prelude::Conf;
use shared::{Difficulty, CANVAS_HEIGHT, CANVAS_WIDTH};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Server address to connect to
    #[arg(short = 's', long, default_value = "127.0.0.1:8080")]
    server: String,

    /// Play offline against the scripted opponent
    #[arg(short, long)]
    local: bool,

    /// Difficulty for rooms you create and for offline play
    #[arg(short, long, default_value = "normal")]
    difficulty: Difficulty,

    /// Join an existing room by its 6-character code
    #[arg(short, long)]
    join: Option<String>,
}

fn window_conf() -> Conf {
    Conf {
        window_title: "netpong".to_string(),
        window_width: CANVAS_WIDTH as i32,
        window_height: CANVAS_HEIGHT as i32,
        window_resizable: false,
        ..Default::default()
    }
}

#[macroquad::main(window_conf)]
async fn main() {
    env_logger::init();
    let args = Args::parse();

    if args.local {
        info!("Starting offline match ({:?})", args.difficulty);
        client::local::run(args.difficulty).await;
        return;
    }

    info!("Connecting to {}", args.server);
    let mode = match args.join {
        Some(room_id) => SessionMode::Join { room_id },
        None => SessionMode::Create {
            difficulty: args.difficulty,
        },
    };

    match Client::connect(&args.server) {
        Ok(mut session) => {
            if let Err(e) = session.run(mode).await {
                eprintln!("Session ended with error: {}", e);
            }
        }
        Err(e) => eprintln!("Failed to connect: {}", e),
    }
}
