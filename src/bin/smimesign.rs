//! Signs a plain text message read from stdin.

use std::{env, fs, process};
use smime::SigningIdentity;
use smime::mime::MimeNode;
use tokio::io::{AsyncReadExt, AsyncWriteExt};


const USAGE: &str =
    "Usage: smimesign <cert.pem> <key.pem> <from> <to> <subject> \
     [<chain.pem> ...]";

fn read_file(path: &str) -> Vec<u8> {
    match fs::read(path) {
        Ok(data) => data,
        Err(err) => {
            eprintln!("Can’t read {}: {}", path, err);
            process::exit(1)
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let args: Vec<String> = env::args().skip(1).collect();
    if args.len() < 5 {
        eprintln!("{}", USAGE);
        process::exit(2)
    }

    let cert = read_file(&args[0]);
    let key = read_file(&args[1]);
    let chain: Vec<_> = args[5..].iter().map(|path| read_file(path)).collect();
    let identity = match SigningIdentity::from_pem(
        &cert, &key, chain.iter().map(Vec::as_slice)
    ) {
        Ok(identity) => identity,
        Err(err) => {
            eprintln!("Can’t load signing identity: {}", err);
            process::exit(1)
        }
    };

    let mut body = String::new();
    if let Err(err) = tokio::io::stdin().read_to_string(&mut body).await {
        eprintln!("Can’t read message body: {}", err);
        process::exit(1)
    }

    let mut message = MimeNode::new("text/plain; charset=utf-8");
    message.add_header("From", args[2].as_str());
    message.add_header("To", args[3].as_str());
    message.add_header("Subject", args[4].as_str());
    message.set_content(body);

    let signed = match smime::sign_message(message, &identity).await {
        Ok(signed) => signed,
        Err(err) => {
            eprintln!("Can’t sign message: {}", err);
            process::exit(1)
        }
    };
    let data = match signed.build_message().await {
        Ok(data) => data,
        Err(err) => {
            eprintln!("Can’t serialize signed message: {}", err);
            process::exit(1)
        }
    };
    let mut stdout = tokio::io::stdout();
    if let Err(err) = stdout.write_all(&data).await {
        eprintln!("Can’t write message: {}", err);
        process::exit(1)
    }
    if let Err(err) = stdout.flush().await {
        eprintln!("Can’t write message: {}", err);
        process::exit(1)
    }
}
