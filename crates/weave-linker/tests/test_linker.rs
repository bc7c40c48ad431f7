//! Tests for linking declaration chains into woven classes.

mod common;

use common::{
    Value, assert_equivalent, explicit_calls, linked, linked_class, member_names, method_body,
};
use weave_core::Error;
use weave_linker::{link_source, link_with_config};
use weave_utils::{Config, LinkerOptions};

const TAIL_CHAIN: &str = r#"
layers { Tracing, Caching, Auditing }

class Account {
    int _total = 0;

    int Add(int a, int b) {
        _total = _total + a + b;
        log("source");
        return _total;
    }

    [override Tracing]
    int Add(int a, int b) {
        log("tracing", a);
        return base.Add(a, b);
    }

    [override Caching]
    int Add(int a, int b) {
        return base.Add(a, b);
    }

    [override Auditing]
    int Add(int a, int b) {
        log("audit", b);
        return base.Add(a, b);
    }
}
"#;

const SETTER_CHAIN: &str = r#"
layers { Validation, Notification }

class Account {
    int _limit;

    int Limit {
        get { return _limit; }
        set { _limit = value; }
    }

    [override Validation]
    int Limit {
        get { return base.Limit; }
        set { log("validate", value); base.Limit = value; }
    }

    [override Notification]
    int Limit {
        get { return base.Limit; }
        set { base.Limit = value; log("notify", value); }
    }
}
"#;

const SWAPPED_ARGUMENTS: &str = r#"
layers { Swap }

class Calc {
    int Diff(int a, int b) { return a - b; }

    [override Swap]
    int Diff(int a, int b) { return base.Diff(b, a); }
}
"#;

const EARLY_RETURN: &str = r#"
layers { Guard }

class Range {
    int Clamp(int x) {
        if (x > 10) {
            return 10;
        }
        return x;
    }

    [override Guard]
    int Clamp(int x) {
        int r = base.Clamp(x);
        log(r);
        return r;
    }
}
"#;

#[test]
fn test_tail_call_chain_is_fully_inlined() {
    let program = linked(TAIL_CHAIN, &LinkerOptions::default());

    assert_eq!(member_names(&program), vec!["_total", "Add"]);
    assert_eq!(explicit_calls(method_body(&program, "Add")), 0);

    insta::assert_snapshot!(program.classes[0].to_string(), @r#"
    class Account {
        int _total = 0;

        int Add(int a, int b) {
            log("audit", b);
            log("tracing", a);
            _total = _total + a + b;
            log("source");
            return _total;
        }
    }
    "#);
}

#[test]
fn test_tail_call_chain_without_inlining_calls_every_version() {
    let program = linked(TAIL_CHAIN, &LinkerOptions::without_inlining());

    assert_eq!(
        member_names(&program),
        vec!["_total", "Add", "Add_Source", "Add_Tracing", "Add_Caching"]
    );
    assert_eq!(
        method_body(&program, "Add").statements[1].to_string(),
        "return this.Add_Caching(a, b);"
    );
    assert_eq!(
        method_body(&program, "Add_Tracing").statements[1].to_string(),
        "return this.Add_Source(a, b);"
    );
}

#[test]
fn test_tail_call_chain_behaves_like_explicit_calls() {
    assert_equivalent(TAIL_CHAIN, |machine| {
        let first = machine.call("Add", vec![Value::Int(1), Value::Int(2)]);
        let second = machine.call("Add", vec![Value::Int(3), Value::Int(4)]);
        (first, second, machine.field("_total"))
    });
}

#[test]
fn test_setter_chain_passes_value_through() {
    insta::assert_snapshot!(linked_class(SETTER_CHAIN), @r#"
    class Account {
        int _limit;

        int Limit {
            get {
                return _limit;
            }
            set {
                log("validate", value);
                _limit = value;
                log("notify", value);
            }
        }
    }
    "#);
}

#[test]
fn test_setter_chain_behaves_like_explicit_calls() {
    assert_equivalent(SETTER_CHAIN, |machine| {
        machine.set("Limit", Value::Int(7));
        machine.get("Limit")
    });
}

#[test]
fn test_out_of_order_arguments_stay_explicit() {
    insta::assert_snapshot!(linked_class(SWAPPED_ARGUMENTS), @r"
    class Calc {
        int Diff(int a, int b) {
            return this.Diff_Source(b, a);
        }

        int Diff_Source(int a, int b) {
            return a - b;
        }
    }
    ");
}

#[test]
fn test_early_return_jumps_to_return_label() {
    insta::assert_snapshot!(linked_class(EARLY_RETURN), @r"
    class Range {
        int Clamp(int x) {
            int r;
            if (x > 10) {
                r = 10;
                goto __aspect_return_1;
            }
            r = x;
            __aspect_return_1: ;
            log(r);
            return r;
        }
    }
    ");
}

#[test]
fn test_early_return_behaves_like_explicit_calls() {
    for x in [3, 10, 11, 42] {
        assert_equivalent(EARLY_RETURN, |machine| machine.call("Clamp", vec![Value::Int(x)]));
    }
}

#[test]
fn test_return_label_avoids_existing_labels() {
    let source = r#"
        layers { Guard }
        class Range {
            int Clamp(int x) {
                if (x > 10) { return 10; }
                return x;
            }
            [override Guard]
            int Clamp(int x) {
                int r = base.Clamp(x);
                if (r == 0) { goto __aspect_return_1; }
                log(r);
                __aspect_return_1: return r;
            }
        }
    "#;
    let printed = linked_class(source);

    assert!(printed.contains("goto __aspect_return_1_2;"));
    assert!(printed.contains("__aspect_return_1_2: ;"));
    assert!(printed.contains("__aspect_return_1: return r;"));

    for x in [0, 5, 12] {
        assert_equivalent(source, |machine| machine.call("Clamp", vec![Value::Int(x)]));
    }
}

#[test]
fn test_discarded_result_keeps_only_effects() {
    let source = r#"
        layers { Audit }
        class Counter {
            int _count;
            int Touch(int a) {
                _count = _count + a;
                return _count;
            }
            [override Audit]
            int Touch(int a) {
                base.Touch(a);
                log("touched");
                return _count;
            }
        }
    "#;

    insta::assert_snapshot!(linked_class(source), @r#"
    class Counter {
        int _count;

        int Touch(int a) {
            _count = _count + a;
            log("touched");
            return _count;
        }
    }
    "#);
}

#[test]
fn test_discarded_division_still_faults() {
    let source = r#"
        layers { Audit }
        class Calc {
            int F(int a, int b) {
                return a / b;
            }
            [override Audit]
            int F(int a, int b) {
                base.F(a, b);
                return 0;
            }
        }
    "#;

    insta::assert_snapshot!(linked_class(source), @r"
    class Calc {
        int F(int a, int b) {
            _ = a / b;
            return 0;
        }
    }
    ");

    for (a, b) in [(6, 3), (1, 0)] {
        assert_equivalent(source, |machine| {
            machine.call("F", vec![Value::Int(a), Value::Int(b)])
        });
    }
}

#[test]
fn test_discarded_invocation_result_is_still_evaluated() {
    let source = r#"
        layers { Audit }
        class Counter {
            int Next(int a) {
                return Bump(a);
            }
            int Bump(int a) {
                log("bump", a);
                return a + 1;
            }
            [override Audit]
            int Next(int a) {
                _ = base.Next(a);
                return a;
            }
        }
    "#;
    let program = linked(source, &LinkerOptions::default());

    assert_eq!(member_names(&program), vec!["Next", "Bump"]);
    assert_eq!(
        method_body(&program, "Next").statements[0].to_string(),
        "Bump(a);"
    );
    assert_equivalent(source, |machine| machine.call("Next", vec![Value::Int(4)]));
}

#[test]
fn test_loop_return_assigns_and_jumps() {
    let source = r#"
        layers { Scan }
        class Search {
            int Find(int n) {
                int i = 0;
                while (i < n) {
                    if (i * i > n) { return i; }
                    i = i + 1;
                }
                return -1;
            }
            [override Scan]
            int Find(int n) {
                int found;
                found = base.Find(n);
                log(found);
                return found;
            }
        }
    "#;
    let program = linked(source, &LinkerOptions::default());
    let body = method_body(&program, "Find");

    assert_eq!(explicit_calls(body), 0);
    assert!(body.to_string().contains("found = i;"));
    assert!(body.to_string().contains("goto __aspect_return_1;"));

    for n in [0, 1, 5, 30] {
        assert_equivalent(source, |machine| machine.call("Find", vec![Value::Int(n)]));
    }
}

#[test]
fn test_getter_local_declaration_is_inlined() {
    let source = r#"
        layers { Scale }
        class Meter {
            int _raw = 21;
            int Reading {
                get { log("read"); return _raw; }
            }
            [override Scale]
            int Reading {
                get { var raw = base.Reading; return raw * 2; }
            }
        }
    "#;
    let program = linked(source, &LinkerOptions::default());

    assert_eq!(member_names(&program), vec!["_raw", "Reading"]);
    assert_equivalent(source, |machine| machine.get("Reading"));
}

#[test]
fn test_getter_assignment_and_cast_return_are_inlined() {
    let source = r#"
        layers { Smooth, Clamp }
        class Sensor {
            int _v;
            int P {
                get { if (_v > 5) { return 3; } return _v; }
                set { _v = value; }
            }
            [override Smooth]
            int P {
                get { int x; x = base.P; return x + 1; }
                set { base.P = value; }
            }
            [override Clamp]
            int P {
                get { return (int)base.P; }
                set { base.P = value; }
            }
        }
    "#;
    let program = linked(source, &LinkerOptions::default());
    let printed = program.to_string();

    assert_eq!(member_names(&program), vec!["_v", "P"]);
    assert!(!printed.contains("this."));
    assert!(printed.contains("x = 3;"));
    assert!(printed.contains("goto __aspect_return_1;"));
    assert!(printed.contains("x = _v;"));
    assert!(printed.contains("__aspect_return_1: ;"));
    assert!(printed.contains("return x + 1;"));
    assert!(!printed.contains("(int)"));

    for v in [2, 9] {
        assert_equivalent(source, |machine| {
            machine.set("P", Value::Int(v));
            machine.get("P")
        });
    }
}

#[test]
fn test_indexer_chain() {
    let source = r#"
        layers { Bounds }
        class Vector {
            int _x;
            int this[int i] {
                get { return _x + i; }
                set { _x = value - i; }
            }
            [override Bounds]
            int this[int i] {
                get { log("get", i); return base[i]; }
                set { log("set", i); base[i] = value; }
            }
        }
    "#;

    let inlined = linked(source, &LinkerOptions::default());
    assert_eq!(member_names(&inlined), vec!["_x", "Item"]);

    let explicit = linked(source, &LinkerOptions::without_inlining());
    assert_eq!(
        member_names(&explicit),
        vec!["_x", "Item", "get_Item_Source", "set_Item_Source"]
    );
    let printed = explicit.to_string();
    assert!(printed.contains("return this.get_Item_Source(i);"));
    assert!(printed.contains("this.set_Item_Source(i, value);"));

    assert_equivalent(source, |machine| {
        machine.set_index(vec![Value::Int(2)], Value::Int(10));
        machine.index(vec![Value::Int(3)])
    });
}

#[test]
fn test_event_chain() {
    let source = r#"
        layers { Logging }
        class Button {
            int _handlers;
            event Handler Clicked {
                add { _handlers = _handlers + 1; }
                remove { _handlers = _handlers - 1; }
            }
            [override Logging]
            event Handler Clicked {
                add { log("add"); base.Clicked += value; }
                remove { base.Clicked -= value; log("remove"); }
            }
        }
    "#;

    let inlined = linked(source, &LinkerOptions::default());
    assert_eq!(member_names(&inlined), vec!["_handlers", "Clicked"]);

    let explicit = linked(source, &LinkerOptions::without_inlining());
    assert_eq!(
        member_names(&explicit),
        vec!["_handlers", "Clicked", "Clicked_Source"]
    );
    assert!(explicit.to_string().contains("this.Clicked_Source += value;"));

    assert_equivalent(source, |machine| {
        machine.subscribe("Clicked", Value::Null);
        machine.subscribe("Clicked", Value::Null);
        machine.unsubscribe("Clicked", Value::Null);
        machine.field("_handlers")
    });
}

#[test]
fn test_twice_referenced_version_becomes_helper() {
    let source = r#"
        layers { Retry }
        class Client {
            int _attempts;
            int Send(int a) {
                _attempts = _attempts + 1;
                return a;
            }
            [override Retry]
            int Send(int a) {
                int first = base.Send(a);
                if (first > 0) { return first; }
                return base.Send(a);
            }
        }
    "#;
    let program = linked(source, &LinkerOptions::default());

    assert_eq!(member_names(&program), vec!["_attempts", "Send", "Send_Source"]);
    assert_eq!(explicit_calls(method_body(&program, "Send")), 2);

    for a in [-1, 1] {
        assert_equivalent(source, |machine| {
            let result = machine.call("Send", vec![Value::Int(a)]);
            (result, machine.field("_attempts"))
        });
    }
}

#[test]
fn test_base_skips_layers_of_the_same_aspect() {
    let source = r#"
        layers { Cache.Read, Cache.Write }
        class Store {
            int Get(int k) { log("source"); return k; }
            [override Cache.Read]
            int Get(int k) { log("read"); return base.Get(k); }
            [override Cache.Write]
            int Get(int k) { log("write"); return base.Get(k); }
        }
    "#;
    let program = linked(source, &LinkerOptions::default());
    let printed = method_body(&program, "Get").to_string();

    assert!(printed.contains("log(\"write\");"));
    assert!(printed.contains("log(\"source\");"));
    assert!(!printed.contains("log(\"read\");"));
}

#[test]
fn test_final_reference_calls_the_public_member() {
    let source = r#"
        layers { Logging }
        class Account {
            int Balance() { return 5; }
            int Report() { return 0; }
            [override Logging]
            int Report() { log("report"); return final.Balance(); }
        }
    "#;

    let printed = linked_class(source);
    assert!(printed.contains("return this.Balance();"));
}

#[test]
fn test_cleanup_can_be_disabled() {
    let options = LinkerOptions {
        cleanup: false,
        ..LinkerOptions::default()
    };
    let program = linked(TAIL_CHAIN, &options);
    let body = method_body(&program, "Add");

    assert_eq!(body.statements.len(), 2);
    assert!(matches!(
        &body.statements[1],
        weave_parser::Statement::Block(block) if block.flattenable
    ));
}

#[test]
fn test_relinking_linked_output_is_a_no_op() {
    for source in [TAIL_CHAIN, SETTER_CHAIN, SWAPPED_ARGUMENTS, EARLY_RETURN] {
        for options in [LinkerOptions::default(), LinkerOptions::without_inlining()] {
            let printed = linked(source, &options).to_string();
            let relinked = linked(&printed, &options).to_string();
            assert_eq!(printed, relinked);
        }
    }
}

#[test]
fn test_unresolvable_reference_is_an_error() {
    let source = r#"
        class Account {
            int Balance() { return base.Balance(); }
        }
    "#;

    let result = link_source(source, &LinkerOptions::default());
    assert!(matches!(result, Err(Error::Resolution(..))));
}

#[test]
fn test_link_with_config_reads_linker_table() {
    let config = Config::parse("[linker]\ninlining = false\n").unwrap();
    let program = link_with_config(SWAPPED_ARGUMENTS, &config).unwrap();
    assert_eq!(member_names(&program), vec!["Diff", "Diff_Source"]);

    let program = link_with_config(TAIL_CHAIN, &config).unwrap();
    assert_eq!(member_names(&program).len(), 5);
}
