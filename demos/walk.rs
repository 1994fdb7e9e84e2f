//! Scripted walk - run with: cargo run --example walk -- Bird No Yes

use std::env;
use std::process::ExitCode;

use sanctuary_guide::found_animal::bundled_tree;
use sanctuary_guide::navigator::Navigator;

fn main() -> ExitCode {
    let tree = match bundled_tree() {
        Ok(tree) => tree,
        Err(e) => {
            eprintln!("Bundled tree is invalid: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let mut nav = Navigator::new(&tree);

    for name in env::args().skip(1) {
        if let Err(e) = nav.select_option(&name) {
            eprintln!("Stopped: {}", e);
            break;
        }
    }

    println!("Path: {}", nav.breadcrumbs().join(" › "));
    println!();
    for line in nav.current_prompt() {
        println!("{}", line);
    }
    println!();

    if nav.is_terminal() {
        println!("(final recommendation)");
    } else {
        for (i, option) in nav.available_options().iter().enumerate() {
            println!("  {}. {}", i + 1, option);
        }
    }

    ExitCode::SUCCESS
}
