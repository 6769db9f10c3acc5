use serde_json::json;

use deepcheck::check::DeepCheckError;
use deepcheck::script::ScriptFunction;
use deepcheck::testing::{Checker, throws, trim_err};
use deepcheck::{Class, Options, Value, deep_check};

mod setup;
use setup::{Case, Fixtures, anonymous_fn, arr, date, json, obj, re};

fn run_cases(cases: Vec<Case>) {
    for case in cases {
        let result = deep_check(&case.data, &case.schema, &Options::default());
        match (result, case.message) {
            (Ok(()), None) => {}
            (Ok(()), Some(message)) => panic!("{}: expected failure '{message}'", case.it),
            (Err(err), None) => panic!("{}: unexpected failure '{err}'", case.it),
            (Err(err), Some(message)) => assert_eq!(err.to_string(), message, "{}", case.it),
        }
    }
}

#[test]
fn test_strings() {
    run_cases(vec![
        Case::valid("string valid", json(json!("foo")), json(json!("foo"))),
        Case::valid(
            "string type only valid",
            json(json!("foo")),
            json(json!({"type": "string"})),
        ),
        Case::invalid(
            "string type only invalid",
            json(json!(5)),
            json(json!({"type": "string"})),
            "data at root was not a string, but it should be",
        ),
        Case::invalid(
            "string invalid",
            json(json!("foo")),
            json(json!("bar")),
            "data 'foo' did not equal 'bar' at root",
        ),
        Case::valid(
            "string object valid",
            json(json!("foo")),
            json(json!({"type": "string", "data": "foo"})),
        ),
        Case::invalid(
            "string object invalid",
            json(json!("foo")),
            json(json!({"type": "string", "data": "bar"})),
            "data 'foo' did not equal 'bar' at root",
        ),
        Case::valid(
            "string regex valid",
            json(json!("foo something crazy")),
            obj([("type", json(json!("string"))), ("data", re("^foo.*crazy$"))]),
        ),
        Case::invalid(
            "string regex invalid",
            json(json!("foo something crazy")),
            obj([("type", json(json!("string"))), ("data", re("bogus"))]),
            "data 'foo something crazy' did not contain '/bogus/' at root",
        ),
        Case::valid(
            "string regex array, valid",
            json(json!("foo something crazy")),
            obj([
                ("type", json(json!("string"))),
                ("data", arr([re("foo"), re("crazy")])),
            ]),
        ),
        Case::invalid(
            "string regex array, invalid",
            json(json!("foo something crazy")),
            obj([
                ("type", json(json!("string"))),
                ("data", arr([re("foo"), re("bogus")])),
            ]),
            "data 'foo something crazy' did not contain '/bogus/' at root",
        ),
    ]);
}

#[test]
fn test_numbers_and_booleans() {
    run_cases(vec![
        Case::valid("number valid", json(json!(1)), json(json!(1))),
        Case::valid(
            "number type only valid",
            json(json!(5)),
            json(json!({"type": "number"})),
        ),
        Case::invalid(
            "number type only invalid",
            json(json!("foo")),
            json(json!({"type": "number"})),
            "data at root was not a number, but it should be",
        ),
        Case::invalid(
            "number invalid",
            json(json!(1)),
            json(json!(2)),
            "data '1' did not equal '2' at root",
        ),
        Case::valid(
            "number object valid",
            json(json!(1)),
            json(json!({"type": "number", "data": 1})),
        ),
        Case::valid("boolean valid", json(json!(true)), json(json!(true))),
        Case::invalid(
            "boolean invalid",
            json(json!(false)),
            json(json!(true)),
            "data 'false' did not equal 'true' at root",
        ),
        Case::valid(
            "boolean type only valid",
            json(json!(false)),
            json(json!({"type": "boolean"})),
        ),
        Case::invalid(
            "boolean type only invalid",
            json(json!(5)),
            json(json!({"type": "boolean"})),
            "data at root was not a boolean, but it should be",
        ),
    ]);
}

#[test]
fn test_objects() {
    let fx = Fixtures::new();
    let instance = fx.instance(json!({"foo": "fooValue", "bar": "barValue"}));

    run_cases(vec![
        Case::valid(
            "object valid",
            json(json!({"foo": "fooValue"})),
            json(json!({"type": "object", "data": {"foo": "fooValue"}})),
        ),
        Case::invalid(
            "object invalid",
            json(json!({"foo": "fooValue"})),
            json(json!({"type": "object", "data": {"foo": "barValue"}})),
            "data 'fooValue' did not equal 'barValue' at root.foo",
        ),
        Case::valid(
            "object valid more keys",
            json(json!({"foo": "fooValue", "bar": "barValue"})),
            json(json!({"type": "object", "data": {"foo": "fooValue"}})),
        ),
        Case::invalid(
            "object invalid more keys",
            json(json!({"foo": "fooValue"})),
            json(json!({"type": "object", "data": {"foo": "fooValue", "bar": "barValue"}})),
            "data at root.bar was not a string, but it should be",
        ),
        Case::valid(
            "object recurse valid",
            json(json!({"foo": {"bar": {"baz": "bazValue"}}})),
            json(json!({"type": "object", "data": {"foo": {"type": "object", "data": {"bar": {"type": "object", "data": {"baz": "bazValue"}}}}}})),
        ),
        Case::invalid(
            "object recurse invalid",
            json(json!({"foo": {"bar": {"baz": "bazValue"}}})),
            json(json!({"type": "object", "data": {"foo": {"type": "object", "data": {"bar": {"type": "object", "data": {"baz": "wrongValue"}}}}}})),
            "data 'bazValue' did not equal 'wrongValue' at root.foo.bar.baz",
        ),
        Case::valid(
            "object shorthand valid",
            json(json!({"foo": {"bar": {"baz": "bazValue"}}})),
            json(json!({"foo": {"bar": {"baz": "bazValue"}}})),
        ),
        Case::invalid(
            "object shorthand invalid",
            json(json!({"foo": {"bar": {"baz": "bazValue"}}})),
            json(json!({"foo": {"bar": {"baz": "bazValue2"}}})),
            "data 'bazValue' did not equal 'bazValue2' at root.foo.bar.baz",
        ),
        Case::valid("object empty", json(json!({})), json(json!({}))),
        Case::invalid(
            "object failed recursion",
            json(json!({"foo": {"bar": {"baz": "bazValue"}}})),
            json(json!({"foo": {"baz": {"qux": "quxValue"}}})),
            "data at root.foo.baz was not an object, but it should be",
        ),
        Case::invalid(
            "object enforce keys",
            json(json!({"foo": "fooValue", "bar": "barValue"})),
            json(json!({"type": "object", "allowExtraKeys": false, "data": {"foo": "fooValue"}})),
            "extra key 'bar' at root",
        ),
        Case::invalid(
            "object shorthand enforce key invalid",
            json(json!({"foo": "fooValue", "bar": "barValue"})),
            json(json!({"_deepCheck_allowExtraKeys": false, "foo": "fooValue"})),
            "extra key 'bar' at root",
        ),
        Case::valid(
            "object shorthand enforce key valid",
            json(json!({"foo": "fooValue", "bar": "barValue"})),
            json(json!({"_deepCheck_allowExtraKeys": false, "foo": "fooValue", "bar": "barValue"})),
        ),
        Case::valid(
            "object class valid",
            obj([("foo", instance.clone())]),
            obj([(
                "foo",
                obj([
                    ("type", json(json!("object"))),
                    ("allowExtraKeys", json(json!(false))),
                    ("data", json(json!({"foo": "fooValue", "bar": "barValue"}))),
                    ("class", Value::from(fx.test_class.clone())),
                ]),
            )]),
        ),
        Case::invalid(
            "object class invalid",
            obj([("foo", instance.clone())]),
            obj([(
                "foo",
                obj([
                    ("type", json(json!("object"))),
                    ("allowExtraKeys", json(json!(false))),
                    ("data", json(json!({"foo": "fooValue", "bar": "barValue"}))),
                    ("class", Value::from(Class::date())),
                ]),
            )]),
            "data at root.foo was not instanceof the proper class",
        ),
        Case::valid(
            "object with no data",
            obj([("foo", date(2020, 1, 1, 0))]),
            obj([(
                "foo",
                obj([
                    ("type", json(json!("object"))),
                    ("class", Value::from(Class::date())),
                ]),
            )]),
        ),
        Case::valid(
            "object builtin classes",
            obj([("pattern", re("^foo")), ("list", arr([json(json!(1))]))]),
            obj([
                (
                    "pattern",
                    obj([
                        ("type", json(json!("object"))),
                        ("class", Value::from(Class::regexp())),
                    ]),
                ),
                (
                    "list",
                    obj([
                        ("type", json(json!("object"))),
                        ("class", Value::from(Class::array())),
                    ]),
                ),
            ]),
        ),
        Case::invalid(
            "object builtin class mismatch",
            obj([("pattern", date(2020, 1, 1, 0))]),
            obj([(
                "pattern",
                obj([
                    ("type", json(json!("object"))),
                    ("class", Value::from(Class::regexp())),
                ]),
            )]),
            "data at root.pattern was not instanceof the proper class",
        ),
        Case::invalid(
            "object key check",
            fx.instance(json!({"foo": "something", "bar": "somethingElse"})),
            obj([
                ("type", json(json!("object"))),
                ("class", Value::from(fx.test_class.clone())),
                ("allowExtraKeys", json(json!(false))),
                ("data", json(json!({"foo": "something"}))),
            ]),
            "extra key 'bar' at root",
        ),
        Case::valid(
            "object shorthand with non-standard type",
            json(json!({"type": "foo", "foo": "dataValue"})),
            json(json!({"type": "foo", "foo": "dataValue"})),
        ),
        Case::invalid(
            "object shorthand with non-standard type invalid",
            json(json!({"type": "foo", "foo": "dataValue"})),
            json(json!({"type": "bar", "foo": "dataValue"})),
            "data 'foo' did not equal 'bar' at root.type",
        ),
        Case::valid(
            "shorthand with just data key valid",
            json(json!({"data": {"something": true}})),
            json(json!({"data": {"something": true}})),
        ),
        Case::invalid(
            "shorthand with just data key invalid",
            json(json!({"data": {"something": true}})),
            json(json!({"data": {"something": false}})),
            "data 'true' did not equal 'false' at root.data.something",
        ),
    ]);
}

#[test]
fn test_functions() {
    let fx = Fixtures::new();

    run_cases(vec![
        Case::valid(
            "function check valid",
            fx.func(),
            obj([("type", json(json!("function"))), ("data", fx.func())]),
        ),
        Case::invalid(
            "function check invalid",
            fx.func(),
            obj([("type", json(json!("function"))), ("data", anonymous_fn())]),
            "data at root was not the correct function reference",
        ),
        Case::valid("function check shorthand valid", fx.func(), fx.func()),
        Case::invalid(
            "function check shorthand invalid",
            fx.func(),
            anonymous_fn(),
            "data at root was not the correct function reference",
        ),
        Case::valid(
            "function check with calls valid",
            fx.func(),
            obj([
                ("type", json(json!("function"))),
                ("data", fx.func()),
                (
                    "calls",
                    json(json!([
                        {"args": ["foo", "bar"], "result": "foo_bar"},
                        {"args": ["foo"], "result": "foo_"}
                    ])),
                ),
            ]),
        ),
        Case::invalid(
            "function check with calls invalid",
            obj([("foo", fx.func())]),
            obj([(
                "foo",
                obj([
                    ("type", json(json!("function"))),
                    (
                        "calls",
                        json(json!([
                            {"args": ["foo"], "result": "foo_"},
                            {"args": ["foo", "bar"], "result": "foo"}
                        ])),
                    ),
                ]),
            )]),
            "data 'foo_bar' did not match 'foo' returned by the function at root.foo on call index 1",
        ),
        Case::invalid(
            "function type invalid",
            json(json!("foo")),
            json(json!({"type": "function"})),
            "data at root was not of type function",
        ),
    ]);
}

#[test]
fn test_dates() {
    run_cases(vec![
        Case::valid(
            "date shorthand valid",
            date(2011, 2, 1, 0),
            date(2011, 2, 1, 0),
        ),
        Case::invalid(
            "date shorthand invalid",
            date(2011, 2, 1, 0),
            date(2011, 2, 1, 1),
            "date data '2011-02-01T00:00:00.000Z' did not equal '2011-02-01T01:00:00.000Z' at root",
        ),
        Case::invalid(
            "date shorthand invalid str",
            json(json!("foo")),
            date(2011, 2, 1, 0),
            "data at root was not of type date",
        ),
        Case::valid(
            "date valid",
            date(2011, 2, 1, 0),
            json(json!({"type": "date", "data": "2011-02-01T00:00:00.000Z"})),
        ),
        Case::invalid(
            "date invalid type",
            json(json!("foo")),
            json(json!({"type": "date", "data": "2011-02-01T00:00:00.000Z"})),
            "data at root was not of type date",
        ),
        Case::valid(
            "date valid type only",
            date(2011, 2, 1, 0),
            json(json!({"type": "date"})),
        ),
        Case::valid(
            "date valid date as data",
            date(2011, 2, 1, 0),
            obj([("type", json(json!("date"))), ("data", date(2011, 2, 1, 0))]),
        ),
        Case::invalid(
            "date invalid value",
            date(2011, 2, 1, 0),
            json(json!({"type": "date", "data": "2012-02-01T00:00:00:00.000Z"})),
            "date data '2011-02-01T00:00:00.000Z' did not equal '2012-02-01T00:00:00:00.000Z' at root",
        ),
        Case::invalid(
            "date invalid str",
            json(json!("2011-02-01T00:00:00.000Z")),
            json(json!({"type": "date", "data": "2011-02-01T00:00:00.000Z"})),
            "data at root was not of type date",
        ),
        Case::valid(
            "date first of year",
            date(2020, 1, 1, 0),
            json(json!({"type": "date"})),
        ),
    ]);
}

#[test]
fn test_arrays() {
    run_cases(vec![
        Case::valid(
            "array simple valid",
            json(json!(["foo", "bar"])),
            json(json!({"type": "array", "data": ["foo", "bar"]})),
        ),
        Case::invalid(
            "array simple invalid",
            json(json!(["foo", "bar"])),
            json(json!({"type": "array", "data": ["foo", "baz"]})),
            "data 'bar' did not equal 'baz' at root.1",
        ),
        Case::invalid(
            "array simple invalid length",
            json(json!(["foo", "bar", "baz"])),
            json(json!({"type": "array", "data": ["foo", "bar"]})),
            "data at root was length 3, should have been length 2",
        ),
        Case::invalid(
            "array simple missing items",
            json(json!(["foo", "bar"])),
            json(json!({"type": "array", "data": ["foo", "bar", "baz"]})),
            "data at root was length 2, should have been length 3",
        ),
        Case::valid(
            "array object valid",
            json(json!([{"foo": "fooValue"}])),
            json(json!({"type": "array", "data": [{"type": "object", "data": {"foo": "fooValue"}}]})),
        ),
        Case::invalid(
            "array object invalid",
            json(json!([{"foo": "fooValue"}])),
            json(json!({"type": "array", "data": [{"type": "object", "data": {"foo": "barValue"}}]})),
            "data 'fooValue' did not equal 'barValue' at root.0.foo",
        ),
        Case::invalid(
            "array object invalid second",
            json(json!([{"foo": "fooValue"}, {"bar": "barValue"}])),
            json(json!({"type": "array", "data": [
                {"type": "object", "data": {"foo": "fooValue"}},
                {"type": "object", "data": {"bar": "fooValue2"}}
            ]})),
            "data 'barValue' did not equal 'fooValue2' at root.1.bar",
        ),
        Case::valid(
            "array shorthand valid",
            json(json!([{"foo": "fooValue"}, {"bar": "barValue"}])),
            json(json!([{"foo": "fooValue"}, {"bar": "barValue"}])),
        ),
        Case::invalid(
            "array shorthand invalid",
            json(json!([{"foo": "fooValue"}, {"bar": "barValue"}])),
            json(json!([{"foo": "fooValue"}, {"bar": "bazValue"}])),
            "data 'barValue' did not equal 'bazValue' at root.1.bar",
        ),
        Case::valid("array empty valid", json(json!([])), json(json!([]))),
        Case::invalid(
            "array type invalid",
            json(json!({"0": "foo"})),
            json(json!(["foo"])),
            "data at root was not an array, but it should be",
        ),
    ]);
}

#[test]
fn test_nulls() {
    run_cases(vec![
        Case::valid(
            "null shorthand valid",
            json(json!({"foo": null})),
            json(json!({"foo": null})),
        ),
        Case::invalid(
            "null shorthand invalid",
            obj([("foo", Value::Undefined)]),
            json(json!({"foo": null})),
            "data at root.foo was not null, but it should be",
        ),
        Case::invalid(
            "null missing key",
            json(json!({})),
            json(json!({"foo": null})),
            "data at root.foo was not null, but it should be",
        ),
    ]);
}

#[test]
fn test_nasty_mess_of_shorthand_and_explicit() {
    let data = json(json!({
        "foo": [true, "yes", 5],
        "bar": [false, "no", 10],
        "nested": {
            "foo": "fooValue",
            "bar": "barValue",
            "notCheck": "notChecked"
        },
        "obj": {
            "arrData": [{"foo": "fooValue1"}, {"foo": "fooValue2"}, {"foo": "fooValue3", "bar": "barValue"}],
            "isHere": true,
            "notChecked": [1, 2, 3]
        }
    }));
    let schema = json(json!({
        "type": "object",
        "data": {
            "foo": [true, "yes", 5],
            "bar": [{"type": "boolean", "data": false}, {"type": "string", "data": "no"}, 10],
            "nested": {
                "foo": "fooValue",
                "bar": {"type": "string", "data": "barValue"}
            },
            "obj": {
                "type": "object",
                "data": {
                    "arrData": {
                        "type": "array",
                        "data": [
                            {"type": "object", "data": {"foo": "fooValue1"}},
                            {"foo": "fooValue2"},
                            {"foo": "fooValue3", "bar": {"type": "string", "data": "barValue"}}
                        ]
                    },
                    "isHere": true
                }
            }
        }
    }));

    assert!(deep_check(&data, &schema, &Options::default()).is_ok());
}

#[test]
fn test_invalid_schema_type() {
    let err = deep_check(
        &json(json!("foo")),
        &json(json!({"type": "bogus"})),
        &Options::default(),
    )
    .unwrap_err();

    assert!(matches!(err, DeepCheckError::SchemaShape(_)));
    let message = err.to_string();
    assert!(message.starts_with("Validation Error\r\n\t"), "{message}");
    assert!(message.contains("bogus"), "{message}");
}

#[test]
fn test_invalid_call_syntax() {
    let fx = Fixtures::new();
    let schema = obj([
        ("type", json(json!("function"))),
        ("calls", json(json!([{"foo": "something"}]))),
    ]);

    let err = deep_check(&fx.func(), &schema, &Options::default()).unwrap_err();

    assert!(matches!(err, DeepCheckError::SchemaShape(_)));
    let message = err.to_string();
    assert!(message.starts_with("Validation Error\r\n\t"), "{message}");
    assert!(message.contains("foo"), "{message}");
}

#[test]
fn test_options_are_the_fallback_policy() {
    let data = json(json!({"foo": "fooValue", "bar": "barValue"}));
    let strict = Options::new().with_allow_extra_keys(false);

    let err = deep_check(&data, &json(json!({"foo": "fooValue"})), &strict).unwrap_err();
    assert_eq!(err.to_string(), "extra key 'bar' at root");

    let item_loose = json(json!({"type": "object", "allowExtraKeys": true, "data": {"foo": "fooValue"}}));
    assert!(deep_check(&data, &item_loose, &strict).is_ok());

    let marker_loose = json(json!({"_deepCheck_allowExtraKeys": true, "foo": "fooValue"}));
    assert!(deep_check(&data, &marker_loose, &strict).is_ok());
}

#[test]
fn test_call_result_ignores_caller_options() {
    let make = deepcheck::Function::new(|_, _| Ok(Value::object([("a", 1), ("b", 2)])));
    let schema = obj([
        ("type", json(json!("function"))),
        ("calls", json(json!([{"result": {"a": 1}}]))),
    ]);

    assert!(deep_check(&Value::from(make.clone()), &schema, &Options::default()).is_ok());

    let strict = Options::new().with_allow_extra_keys(false);
    assert!(deep_check(&Value::from(make.clone()), &schema, &strict).is_ok());

    // the result schema can still opt in
    let strict_result = obj([
        ("type", json(json!("function"))),
        (
            "calls",
            json(json!([{"result": {"_deepCheck_allowExtraKeys": false, "a": 1}}])),
        ),
    ]);
    let err = deep_check(&Value::from(make), &strict_result, &Options::default()).unwrap_err();
    assert_eq!(
        err.to_string(),
        "data '[object Object]' did not match '[object Object]' returned by the function at root on call index 0"
    );
}

#[test]
fn test_script_method_bound_to_parent() {
    let greet = ScriptFunction::compile(r#"fn greet(name) { this.greeting + ", " + name }"#, "greet")
        .unwrap()
        .into_function();

    let data = obj([
        ("greeting", json(json!("hello"))),
        ("greet", Value::from(greet.clone())),
    ]);
    let schema = obj([(
        "greet",
        obj([
            ("type", json(json!("function"))),
            ("data", Value::from(greet)),
            ("calls", json(json!([{"args": ["world"], "result": "hello, bob"}]))),
        ]),
    )]);

    let err = deep_check(&data, &schema, &Options::default()).unwrap_err();
    assert_eq!(
        err.to_string(),
        "data 'hello, world' did not match 'hello, bob' returned by the function at root.greet on call index 0"
    );
}

#[test]
fn test_extended_json_documents() {
    let data = Value::from_extended_json(json!({
        "created": {"$date": "2011-02-01T00:00:00.000Z"},
        "name": "foo something crazy"
    }))
    .unwrap();
    let schema = Value::from_extended_json(json!({
        "created": {"$date": {"$numberLong": "1296518400000"}},
        "name": {"type": "string", "data": {"$regularExpression": {"pattern": "CRAZY$", "options": "i"}}}
    }))
    .unwrap();

    assert!(deep_check(&data, &schema, &Options::default()).is_ok());
}

#[test]
fn test_failures_through_assertion_helpers() {
    let result = throws(
        || deep_check(&json(json!("foo")), &json(json!("bar")), &Options::default()),
        Checker::Message("data 'foo' did not equal 'bar' at root"),
    );
    assert!(result.is_ok());

    let result = throws(
        || deep_check(&json(json!(["a", "b"])), &json(json!(["a", "c"])), &Options::default()),
        Checker::inspect(|message: &str| {
            trim_err(
                message,
                "data 'b'   did not equal 'c'
                 at root.1",
            )
        }),
    );
    assert!(result.is_ok());
}
