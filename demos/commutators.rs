//! Commutator algebra walkthrough.
//!
//! Registers a small operator algebra, expands a commutator of products with
//! the Leibniz rule, then evaluates and distributes everything.
//!
//! Run with:
//! ```bash
//! cargo run --example commutators
//! ```

use rewrite_rs::kind::{Combine, KindSpec, Notation};
use rewrite_rs::manager::Manager;
use rewrite_rs::pattern::Pattern;
use rewrite_rs::rule::Rule;
use rewrite_rs::ruleset::RuleSet;
use rewrite_rs::toolbox;
use rewrite_rs::types::Tag;
use rewrite_rs::wildcard::wc;

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    simplelog::TermLogger::init(
        simplelog::LevelFilter::Debug,
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    let mut mgr = Manager::new();
    let op = mgr.register_algebra("Operator");
    let times = mgr.register_kind(
        KindSpec::nary("OperatorTimes", op)
            .combine(Combine::Multiply)
            .notation(Notation::infix(" * ")),
    )?;
    let plus = mgr.register_kind(
        KindSpec::nary("OperatorPlus", op)
            .commutative()
            .combine(Combine::Add { scale: times })
            .notation(Notation::infix(" + ")),
    )?;
    let comm = mgr.register_kind(KindSpec::binary("Commutator", op).notation(Notation::Bracket))?;
    println!("mgr = {:?}", mgr);

    let a = mgr.symbol("A", op)?;
    let b = mgr.symbol("B", op)?;
    let c = mgr.symbol("C", op)?;

    let ab = mgr.create(times, [a.clone(), b.clone()])?;
    let expr = mgr.binary(comm, ab, c.clone())?;
    println!("expr = {}", mgr.render(&expr));

    let leibniz = toolbox::expand_commutators_leibniz(&mgr, &expr, comm, times, plus, true)?;
    println!("leibniz = {}", mgr.render(&leibniz));

    let evaluated = toolbox::evaluate_commutators(&mgr, &leibniz, comm, times, plus)?;
    println!("evaluated = {}", mgr.render(&evaluated));

    let expanded = toolbox::expand(&mgr, &evaluated, times, plus)?;
    println!("expanded = {}", mgr.render(&expanded));

    // Declare [A, B] = 0 for the symbols A and B and watch the result collapse.
    let commuting = RuleSet::builder("commuting")
        .rule(Rule::new(
            "a_b_commute",
            Pattern::shape(comm, [wc("x").head(Tag::Symbol), wc("y").head(Tag::Symbol)]),
            move |m, bindings| {
                let names = (bindings["x"].name(), bindings["y"].name());
                if matches!(names, (Some("A"), Some("B")) | (Some("B"), Some("A"))) {
                    Ok(Some(m.zero(op)))
                } else {
                    Ok(None)
                }
            },
        ))
        .build(&mgr)?;
    let sum = mgr.create(plus, [a.clone(), c.clone()])?;
    let expr = mgr.binary(comm, mgr.create(times, [a, b])?, sum)?;
    let leibniz = toolbox::expand_commutators_leibniz(&mgr, &expr, comm, times, plus, true)?;
    let reduced = mgr.simplify(&leibniz, &commuting)?;
    println!("{} = {}", mgr.render(&expr), mgr.render(&reduced));

    println!("cache: {} nodes, {} hits, {} misses", mgr.cache().len(), mgr.cache().hits(), mgr.cache().misses());

    Ok(())
}
