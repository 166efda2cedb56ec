//! Interactive classifier / arbiter explorer.
//!
//! Pick a hand shape (or type raw fingertip heights) for each side and see
//! what the classifier and the dominance table make of them.

use duel_sync::{classify, decide, poses, GestureLabel};
use hand_landmarks::{Finger, LandmarkFrame};
use std::io::{self, Write};

fn main() {
    println!();
    println!("╔══════════════════════════════════════════════════════════╗");
    println!("║            Rock · Paper · Scissors Explorer              ║");
    println!("╚══════════════════════════════════════════════════════════╝");
    println!();

    loop {
        let local  = pick_hand("LOCAL ");
        let remote = pick_hand("REMOTE");

        let ll = classify(local.as_ref());
        let rl = classify(remote.as_ref());
        println!();
        println!("  Local  : {}", describe(local.as_ref(), ll));
        println!("  Remote : {}", describe(remote.as_ref(), rl));
        println!("  Outcome: {:?}  ({})", decide(ll, rl), decide(ll, rl));
        println!();

        if read_line("Another round? (Y/n): ").trim().eq_ignore_ascii_case("n") {
            println!("\nGoodbye!\n");
            break;
        }
        println!();
    }
}

fn pick_hand(side: &str) -> Option<LandmarkFrame> {
    loop {
        println!("  {} hand:", side);
        println!("    1. Fist   2. Open palm   3. Scissors   4. No hand   5. Custom tip heights");
        match read_line("  Choice (1–5): ").trim() {
            "1" => return Some(poses::fist()),
            "2" => return Some(poses::open_palm()),
            "3" => return Some(poses::scissors()),
            "4" => return None,
            "5" => {
                if let Some(tips) = read_tips() {
                    return Some(poses::with_tip_heights(tips));
                }
                println!("  ⚠  Need five numbers: thumb index middle ring pinky.\n");
            }
            _ => println!("  ⚠  Please enter 1–5.\n"),
        }
    }
}

fn read_tips() -> Option<[f32; 5]> {
    let line = read_line("  Tip y (thumb index middle ring pinky, 0.0 = top): ");
    let vals: Vec<f32> = line
        .split_whitespace()
        .filter_map(|s| s.parse().ok())
        .collect();
    <[f32; 5]>::try_from(vals).ok()
}

fn describe(frame: Option<&LandmarkFrame>, label: GestureLabel) -> String {
    match frame {
        None => format!("{:<8} (no hand)", label.name()),
        Some(f) => {
            let tips: Vec<String> = Finger::all()
                .iter()
                .map(|&d| format!("{}={:.2}", d.name(), f.tip(d).y))
                .collect();
            format!("{:<8} [{}]", label.name(), tips.join(" "))
        }
    }
}

fn read_line(prompt: &str) -> String {
    print!("{}", prompt);
    io::stdout().flush().ok();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf
}
