use std::collections::HashMap;

use rewrite_rs::error::Error;
use rewrite_rs::expr::Expr;
use rewrite_rs::kind::{Combine, Domain, Element, KindSpec, Notation};
use rewrite_rs::manager::Manager;
use rewrite_rs::pattern::Pattern;
use rewrite_rs::rule::Rule;
use rewrite_rs::ruleset::RuleSet;
use rewrite_rs::scalar::Scalar;
use rewrite_rs::simplify::SimplifyConfig;
use rewrite_rs::toolbox;
use rewrite_rs::types::{AlgebraId, KindId, Tag};
use rewrite_rs::wildcard::wc;
use test_log::test;

/// A small operator algebra with states and circuits on the side.
struct Physics {
    mgr: Manager,
    op: AlgebraId,
    ket: AlgebraId,
    circuit: AlgebraId,
    times: KindId,
    plus: KindId,
    comm: KindId,
    dagger: KindId,
    apply: KindId,
    concat: KindId,
}

fn physics() -> Physics {
    let mut mgr = Manager::new();
    let op = mgr.register_algebra("Operator");
    let ket = mgr.register_algebra("Ket");
    let circuit = mgr.register_algebra("Circuit");
    let times = mgr
        .register_kind(
            KindSpec::nary("OperatorTimes", op)
                .combine(Combine::Multiply)
                .notation(Notation::infix(" * ")),
        )
        .unwrap();
    let plus = mgr
        .register_kind(
            KindSpec::nary("OperatorPlus", op)
                .commutative()
                .combine(Combine::Add { scale: times })
                .notation(Notation::infix(" + ")),
        )
        .unwrap();
    let comm = mgr
        .register_kind(KindSpec::binary("Commutator", op).notation(Notation::Bracket))
        .unwrap();
    let dagger = mgr
        .register_kind(
            KindSpec::unary("Adjoint", op)
                .involutive()
                .notation(Notation::postfix("^H")),
        )
        .unwrap();
    let apply = mgr
        .register_kind(
            KindSpec::binary("OperatorTimesKet", ket)
                .domain(Domain::Positional(vec![op, ket]))
                .notation(Notation::infix(" ")),
        )
        .unwrap();
    let concat = mgr
        .register_kind(
            KindSpec::nary("Concatenation", circuit)
                .unit(Element::Identity)
                .notation(Notation::infix(" + ")),
        )
        .unwrap();
    Physics {
        mgr,
        op,
        ket,
        circuit,
        times,
        plus,
        comm,
        dagger,
        apply,
        concat,
    }
}

impl Physics {
    fn sym(&self, name: &str) -> Expr {
        self.mgr.symbol(name, self.op).unwrap()
    }
    fn mul(&self, operands: &[&Expr]) -> Expr {
        self.mgr.create(self.times, operands.iter().map(|&e| e.clone())).unwrap()
    }
    fn add(&self, operands: &[&Expr]) -> Expr {
        self.mgr.create(self.plus, operands.iter().map(|&e| e.clone())).unwrap()
    }
    fn comm(&self, a: &Expr, b: &Expr) -> Expr {
        self.mgr.binary(self.comm, a.clone(), b.clone()).unwrap()
    }
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn scenario_leibniz_expansion() {
    let p = physics();
    let (a, b, c) = (p.sym("A"), p.sym("B"), p.sym("C"));
    let expr = p.comm(&p.mul(&[&a, &b]), &c);

    let result = toolbox::expand_commutators_leibniz(&p.mgr, &expr, p.comm, p.times, p.plus, true).unwrap();
    let expected = p.add(&[&p.mul(&[&a, &p.comm(&b, &c)]), &p.mul(&[&p.comm(&a, &c), &b])]);
    assert_eq!(result, expected);
    assert_eq!(p.mgr.render(&result), "A * [B, C] + [A, C] * B");
}

#[test]
fn scenario_commutator_evaluation() {
    let p = physics();
    let (a, b) = (p.sym("A"), p.sym("B"));
    let result = toolbox::evaluate_commutators(&p.mgr, &p.comm(&a, &b), p.comm, p.times, p.plus).unwrap();
    let minus_ba = p.mul(&[&p.mgr.scalar(-1), &b, &a]);
    assert_eq!(result, p.add(&[&p.mul(&[&a, &b]), &minus_ba]));
    assert_eq!(p.mgr.render(&result), "A * B - B * A");
}

#[test]
fn scenario_canonicalization_only() {
    let p = physics();
    let (a, b) = (p.sym("A"), p.sym("B"));
    let one_a = p.mul(&[&p.mgr.scalar(1), &a]);
    let zero_b = p.mul(&[&p.mgr.scalar(0), &b]);
    let expr = p.add(&[&one_a, &zero_b]);
    let result = p.mgr.simplify(&expr, &RuleSet::empty("minimal")).unwrap();
    assert_eq!(result, a);
}

#[test]
fn scenario_distribute() {
    let p = physics();
    let (a, b) = (p.sym("A"), p.sym("B"));
    let sum = p.add(&[&a, &b]);
    let square = p.mul(&[&sum, &sum]);

    let result = toolbox::expand(&p.mgr, &square, p.times, p.plus).unwrap();
    assert_eq!(result.kind(), Some(p.plus));
    assert!(result.operands().len() <= 4);
    for term in result.operands() {
        assert_eq!(term.kind(), Some(p.times));
        assert_eq!(term.operands().len(), 2);
    }
    let expected = p.add(&[
        &p.mul(&[&a, &a]),
        &p.mul(&[&a, &b]),
        &p.mul(&[&b, &a]),
        &p.mul(&[&b, &b]),
    ]);
    assert_eq!(result, expected);

    // With commuting factors the cross terms merge: (A+A)(A+A) = 4 A*A.
    let double = p.add(&[&a, &a]);
    let result = toolbox::expand(&p.mgr, &p.mul(&[&double, &double]), p.times, p.plus).unwrap();
    assert_eq!(result, p.mul(&[&p.mgr.scalar(4), &a, &a]));
}

// ============================================================================
// Canonicalization properties
// ============================================================================

#[test]
fn commutative_symmetry() {
    let p = physics();
    let (a, b, c) = (p.sym("A"), p.sym("B"), p.sym("C"));
    let orders = [[&a, &b, &c], [&c, &b, &a], [&b, &a, &c], [&c, &a, &b]];
    let sums: Vec<Expr> = orders.iter().map(|o| p.add(o)).collect();
    for s in &sums {
        assert_eq!(s, &sums[0]);
        assert!(s.ptr_eq(&sums[0]));
    }
}

#[test]
fn flattening_and_absorption() {
    let p = physics();
    let (a, b, c) = (p.sym("A"), p.sym("B"), p.sym("C"));
    let one = p.mgr.identity(p.op);
    let zero = p.mgr.zero(p.op);

    assert_eq!(p.mul(&[&a, &p.mul(&[&b, &c])]), p.mul(&[&p.mul(&[&a, &b]), &c]));
    assert_eq!(p.mul(&[&one, &a, &one]), a);
    assert_eq!(p.mul(&[&a, &zero, &b]), zero);
    assert_eq!(p.add(&[&zero, &a]), a);

    // Circuits: concatenation drops the identity circuit.
    let c1 = p.mgr.symbol("C1", p.circuit).unwrap();
    let c2 = p.mgr.symbol("C2", p.circuit).unwrap();
    let id = p.mgr.identity(p.circuit);
    let chain = p.mgr.create(p.concat, [c1.clone(), id, c2.clone()]).unwrap();
    assert_eq!(chain.operands(), &[c1.clone(), c2.clone()]);
    assert_ne!(chain, p.mgr.create(p.concat, [c2, c1]).unwrap());
}

#[test]
fn canonicalization_is_idempotent() {
    let p = physics();
    let (a, b) = (p.sym("A"), p.sym("B"));
    let half = p.mgr.scalar(Scalar::ratio(1, 2));
    let exprs = [
        p.add(&[&a, &p.mul(&[&half, &a]), &b]),
        p.mul(&[&p.mgr.scalar(Scalar::i()), &a, &p.add(&[&a, &b])]),
        p.mgr.unary(p.dagger, p.add(&[&a, &b])).unwrap(),
    ];
    for e in &exprs {
        let again = p.mgr.create(e.kind().unwrap(), e.operands().to_vec()).unwrap();
        assert_eq!(&again, e);
    }
}

#[test]
fn type_constraints() {
    let p = physics();
    let a = p.sym("A");
    let psi = p.mgr.symbol("psi", p.ket).unwrap();

    let applied = p.mgr.binary(p.apply, a.clone(), psi.clone()).unwrap();
    assert_eq!(p.mgr.algebra_of(&applied), Some(p.ket));
    assert!(matches!(
        p.mgr.binary(p.apply, psi.clone(), a.clone()),
        Err(Error::TypeConstraint { .. })
    ));
    assert!(matches!(
        p.mgr.create(p.plus, [a, psi]),
        Err(Error::TypeConstraint { .. })
    ));
}

// ============================================================================
// Matching and rules
// ============================================================================

#[test]
fn matcher_soundness() {
    let p = physics();
    let (a, b, c) = (p.sym("A"), p.sym("B"), p.sym("C"));
    let two = p.mgr.scalar(2);
    let exprs = [
        p.mul(&[&two, &a, &b, &c]),
        p.add(&[&a, &p.mul(&[&two, &b]), &c]),
        p.comm(&p.mul(&[&a, &b]), &c),
    ];
    let patterns = [
        Pattern::shape(p.times, [wc("c").head(Tag::Scalar), wc("rest").segment()]),
        Pattern::shape(p.times, [wc("pre").optional_segment(), wc("x"), wc("post").optional_segment()]),
        Pattern::shape(p.plus, [wc("x").head(Tag::Symbol), wc("rest").segment()]),
        Pattern::shape(p.comm, [Pattern::shape(p.times, [wc("x"), wc("y").segment()]), wc("z").into()]),
    ];
    let mut matched = 0;
    for e in &exprs {
        for pattern in &patterns {
            if let Some(bindings) = p.mgr.match_pattern(pattern, e) {
                matched += 1;
                assert_eq!(&pattern.instantiate(&p.mgr, &bindings).unwrap(), e);
            }
        }
    }
    assert!(matched >= 4);
}

#[test]
fn repeated_wildcard_consistency() {
    let p = physics();
    let (a, b) = (p.sym("A"), p.sym("B"));
    let x = wc("x").head(p.op);
    let pattern = Pattern::shape(p.comm, [x.clone(), x]);
    assert!(p.mgr.matches(&pattern, &p.comm(&a, &a)));
    assert!(!p.mgr.matches(&pattern, &p.comm(&a, &b)));
}

#[test]
fn rule_priority() {
    let p = physics();
    let (a, b) = (p.sym("A"), p.sym("B"));
    let op = p.op;
    let to_zero = Rule::new("to_zero", Pattern::shape(p.comm, [wc("x"), wc("y")]), move |m, _| {
        Ok(Some(m.zero(op)))
    });
    let to_one = Rule::new("to_one", Pattern::shape(p.comm, [wc("x"), wc("y")]), move |m, _| {
        Ok(Some(m.identity(op)))
    });
    let ab = p.comm(&a, &b);

    let rules = RuleSet::builder("r").rule(to_zero.clone()).rule(to_one.clone()).build(&p.mgr).unwrap();
    assert_eq!(p.mgr.simplify(&ab, &rules).unwrap(), p.mgr.zero(p.op));
    let rules = RuleSet::builder("r").rule(to_one).rule(to_zero).build(&p.mgr).unwrap();
    assert_eq!(p.mgr.simplify(&ab, &rules).unwrap(), p.mgr.identity(p.op));
}

#[test]
fn invalid_patterns_rejected_at_build_time() {
    let p = physics();
    let noop = |_: &Manager, _: &rewrite_rs::matcher::Bindings| Ok(None);
    let cases = [
        Pattern::from(wc("s").segment()),
        Pattern::shape(p.comm, [wc("x"), wc("y").segment()]),
        Pattern::shape(p.dagger, [wc("x"), wc("y")]),
        Pattern::shape_at_least(p.comm, [wc("x"), wc("y")]),
        Pattern::shape(p.plus, [wc("x").segment(), wc("y").segment()]),
        Pattern::shape(p.times, [wc("x"), wc("x").head(Tag::Scalar)]),
    ];
    for pattern in cases {
        let err = RuleSet::builder("bad")
            .rule(Rule::new("bad_rule", pattern, noop))
            .build(&p.mgr)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidPattern { .. }), "{err}");
    }
}

// ============================================================================
// Simplification
// ============================================================================

fn normal_ordering(p: &Physics) -> RuleSet {
    // Ladder operators: a a^H -> a^H a + 1, anywhere inside a product.
    let (times, plus, dagger) = (p.times, p.plus, p.dagger);
    let a = wc("a").head(Tag::Symbol);
    let pattern = Pattern::shape(
        times,
        [
            Pattern::from(wc("pre").optional_segment()),
            a.clone().into(),
            Pattern::shape(dagger, [a]),
            wc("post").optional_segment().into(),
        ],
    );
    let rule = Rule::new("normal_order", pattern, move |m, b| {
        let pre = b.items("pre").unwrap_or(&[]);
        let post = b.items("post").unwrap_or(&[]);
        let x = &b["a"];
        let x_dag = m.unary(dagger, x.clone())?;
        let swapped = m.create(times, pre.iter().chain([&x_dag, x]).chain(post).cloned())?;
        let contracted = m.create(times, pre.iter().chain(post).cloned())?;
        m.create(plus, [swapped, contracted]).map(Some)
    });
    RuleSet::builder("normal_ordering").rule(rule).build(&p.mgr).unwrap()
}

#[test]
fn normal_ordering_ladder_operators() {
    let p = physics();
    let rules = normal_ordering(&p);
    let a = p.sym("a");
    let a_dag = p.mgr.unary(p.dagger, a.clone()).unwrap();
    let one = p.mgr.identity(p.op);

    let result = p.mgr.simplify(&p.mul(&[&a, &a_dag]), &rules).unwrap();
    assert_eq!(result, p.add(&[&p.mul(&[&a_dag, &a]), &one]));

    // a a a^H = a^H a a + 2 a
    let result = p.mgr.simplify(&p.mul(&[&a, &a, &a_dag]), &rules).unwrap();
    let two_a = p.mul(&[&p.mgr.scalar(2), &a]);
    assert_eq!(result, p.add(&[&p.mul(&[&a_dag, &a, &a]), &two_a]));
}

#[test]
fn simplify_is_idempotent() {
    let p = physics();
    let (a, b, c) = (p.sym("A"), p.sym("B"), p.sym("C"));
    let leibniz = toolbox::leibniz_rules(&p.mgr, p.comm, p.times, p.plus).unwrap();
    let distribute = toolbox::distribute_rules(&p.mgr, p.times, p.plus).unwrap();
    let rules = RuleSet::builder("expand_all")
        .include(&leibniz)
        .include(&distribute)
        .build(&p.mgr)
        .unwrap();

    let exprs = [
        p.comm(&p.mul(&[&a, &b, &c]), &p.add(&[&a, &c])),
        p.mul(&[&p.add(&[&a, &b]), &p.comm(&p.mul(&[&p.mgr.scalar(3), &a]), &b), &c]),
        p.add(&[&p.mul(&[&a, &p.add(&[&b, &c])]), &p.mul(&[&p.mgr.scalar(-1), &a, &b])]),
    ];
    for e in &exprs {
        let once = p.mgr.simplify(e, &rules).unwrap();
        let twice = p.mgr.simplify(&once, &rules).unwrap();
        assert_eq!(once, twice, "{}", p.mgr.render(e));
    }
}

#[test]
fn step_limit_guards_non_terminating_rules() {
    let p = physics();
    let comm = p.comm;
    let swap = Rule::new("swap", Pattern::shape(comm, [wc("x"), wc("y")]), move |m, b| {
        m.binary(comm, b["y"].clone(), b["x"].clone()).map(Some)
    });
    let rules = RuleSet::builder("loop").rule(swap).build(&p.mgr).unwrap();
    let ab = p.comm(&p.sym("A"), &p.sym("B"));
    let err = p
        .mgr
        .simplify_with(&ab, &rules, SimplifyConfig::with_step_limit(50))
        .unwrap_err();
    assert_eq!(err, Error::StepLimitExceeded { limit: 50 });
}

#[test]
fn concurrent_simplify_shares_one_manager() {
    let p = physics();
    let rules = toolbox::evaluate_commutator_rules(&p.mgr, p.comm, p.times, p.plus).unwrap();
    let names = ["A", "B", "C", "D"];
    let results: Vec<Expr> = std::thread::scope(|s| {
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let (p, rules) = (&p, &rules);
                s.spawn(move || {
                    let x = p.sym(names[i % 4]);
                    let y = p.sym(names[(i + 1) % 4]);
                    p.mgr.simplify(&p.comm(&x, &y), rules).unwrap()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });
    for (i, result) in results.iter().enumerate() {
        assert!(result.ptr_eq(&results[i % 4]));
        let x = p.sym(names[i % 4]);
        let y = p.sym(names[(i + 1) % 4]);
        let expected = p.mgr.sub(p.plus, p.mul(&[&x, &y]), p.mul(&[&y, &x])).unwrap();
        assert_eq!(result, &expected);
    }
}

#[test]
fn substitute_recanonicalizes() {
    let p = physics();
    let (a, b, c) = (p.sym("A"), p.sym("B"), p.sym("C"));
    let expr = p.add(&[&p.comm(&a, &b), &p.mul(&[&b, &c])]);
    let map = HashMap::from([(b.clone(), p.mgr.identity(p.op)), (c.clone(), a.clone())]);
    let result = p.mgr.substitute(&expr, &map).unwrap();
    let one = p.mgr.identity(p.op);
    assert_eq!(result, p.add(&[&p.comm(&a, &one), &a]));
    assert_eq!(result.symbols(), vec![a]);
}

#[test]
fn interning_can_be_disabled() {
    use rewrite_rs::manager::ManagerConfig;

    let mut mgr = Manager::with_config(ManagerConfig { interning: false });
    let op = mgr.register_algebra("Operator");
    let times = mgr
        .register_kind(KindSpec::nary("OperatorTimes", op).combine(Combine::Multiply))
        .unwrap();
    let plus = mgr
        .register_kind(
            KindSpec::nary("OperatorPlus", op)
                .commutative()
                .combine(Combine::Add { scale: times }),
        )
        .unwrap();
    let a = mgr.symbol("A", op).unwrap();
    let b = mgr.symbol("B", op).unwrap();
    let s1 = mgr.create(plus, [a.clone(), b.clone()]).unwrap();
    let s2 = mgr.create(plus, [b, a]).unwrap();
    assert!(!s1.ptr_eq(&s2));
    assert_eq!(s1, s2);
    assert!(mgr.cache().is_empty());
}

#[test]
fn deep_expression_lifecycle() {
    let p = physics();
    let a = p.sym("A");
    let mut expr = a.clone();
    for _ in 0..100_000 {
        expr = p.comm(&expr, &a);
    }
    let result = p.mgr.simplify(&expr, &RuleSet::empty("none")).unwrap();
    assert!(result.ptr_eq(&expr));
    assert_eq!(result.depth(), 100_001);
    drop(result);
    drop(expr);
    drop(p);
}
