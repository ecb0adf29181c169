use phontier::{LearnerBuilder, Statistics};

fn main() {
    let pairs = [
        ("ʃ o k u S i S", "ʃ o k u ʃ i ʃ"),
        ("a p ʃ a S", "a p ʃ a ʃ"),
        ("ʃ u n i S", "ʃ u n i ʃ"),
        ("s o k i S", "s o k i s"),
        ("s i g o S i S", "s i g o s i s"),
        ("u t S", "u t s"),
    ];

    let mut learner = LearnerBuilder::new().build().expect("failed to load the bundled table");
    learner.train(pairs).expect("training failed");

    println!("Learned: {}", learner.render_rule());
    if let Some(disc) = learner.discrepancy() {
        println!("Discrepancy: {}", disc.render(learner.inventory()));
    }
    println!("Training accuracy: {:.3}", learner.accuracy(pairs).expect("scoring failed"));

    println!("\nNew forms:");
    for ur in ["ʃ a k a S", "s a k a S", "t a k a S"] {
        let sr = learner.produce_symbols(ur).expect("unknown segment");
        println!("  {:<12} -> {}", ur, sr);
    }

    let stats = learner.stats();
    println!("\nStatistics:");
    println!("  search iterations:    {:>4}", stats.count(Statistics::SEARCH_ITERATIONS));
    println!("  candidates evaluated: {:>4}", stats.count(Statistics::CANDIDATES_EVALUATED));
    println!("  tier refinements:     {:>4}", stats.count(Statistics::TIER_REFINEMENTS));
}
