use herkos::{transpile, TranspileOptions};

fn main() {
    let wat = r#"
        (module
            (func (export "sum_to_n") (param $n i32) (result i32)
                (local $i i32)
                (local $acc i32)
                (local.set $i (i32.const 0))
                (local.set $acc (i32.const 0))
                (block $break
                    (loop $continue
                        (br_if $break (i32.ge_s (local.get $i) (local.get $n)))
                        (local.set $acc (i32.add (local.get $acc) (local.get $i)))
                        (local.set $i (i32.add (local.get $i) (i32.const 1)))
                        (br $continue)
                    )
                )
                (local.get $acc)
            )
            (func (export "select_test") (param $a i32) (param $b i32) (param $c i32) (result i32)
                (if (result i32)
                    (local.get $c)
                    (then (local.get $a))
                    (else (local.get $b))
                )
            )
            (func $double (param i64) (result i64)
                (i64.mul (local.get 0) (i64.const 2))
            )
            (func $halve (param i64) (result i64)
                (i64.div_s (local.get 0) (i64.const 2))
            )
            (table (export "t") 2 2 funcref)
            (elem (i32.const 0) $double $halve)
            (type $i64_to_i64 (func (param i64) (result i64)))
            (func (export "dispatch") (param $idx i32) (param $v i64) (result i64)
                (call_indirect (type $i64_to_i64) (local.get $v) (local.get $idx))
            )
            (func (export "float_id") (param $x f32) (result f32)
                (local.get $x)
            )
            (func (export "double_id") (param $x f64) (result f64)
                (local.get $x)
            )
        )
    "#;
    let wasm = wat::parse_str(wat).unwrap();
    let code = transpile(&wasm, &TranspileOptions::default()).unwrap();
    println!("{code}");
}
