use std::collections::HashMap;

use fpl_backend::{LiveMap, allocate_registers, peephole, peephole_fixpoint, rebuild_index, run_function};
use fpl_config::FplConfig;
use fpl_ir::{
  Function, Instr, RegId,
  reg::{REG_RESULT, REG_ZERO, arg_reg},
};
use fpl_tst::AluOp;
use proptest::prelude::*;

const OPS: [AluOp; 6] = [AluOp::AddI, AluOp::SubI, AluOp::MulI, AluOp::AndI, AluOp::OrI, AluOp::XorI];

/// Values the parameters arrive with in R1, R2 and R3.
const ARGS: [i32; 3] = [11, -5, 300];

/// Written to R1-R7 by every call.
const CLOBBER: i32 = -0x5eed;

/// `g(n) = 2n + 1`, the only function the generated code calls.
fn callee(arg: i32) -> i32 {
  arg.wrapping_mul(2).wrapping_add(1)
}

#[derive(Debug, Clone)]
enum Step {
  Alu(usize, usize, usize),
  Call(usize),
}

/// Parameters copied out of their argument registers, some constants, then
/// ALU operations and calls over earlier values. The last value is returned.
#[derive(Debug, Clone)]
struct Program {
  params: usize,
  constants: Vec<i32>,
  steps: Vec<Step>,
}

fn step() -> impl Strategy<Value = Step> {
  prop_oneof![
    3 => (0usize..OPS.len(), any::<usize>(), any::<usize>()).prop_map(|(op, lhs, rhs)| Step::Alu(op, lhs, rhs)),
    1 => any::<usize>().prop_map(Step::Call),
  ]
}

fn program() -> impl Strategy<Value = Program> {
  (
    0..=ARGS.len(),
    prop::collection::vec(prop_oneof![-20i32..20, any::<i32>()], 1..5),
    prop::collection::vec(step(), 0..12),
  )
    .prop_map(|(params, constants, steps)| Program {
      params,
      constants,
      steps,
    })
}

fn build(program: &Program) -> Function {
  let mut func = Function::new("/f()", true);
  func.add(Instr::Start);
  let mut values: Vec<RegId> = Vec::new();
  for index in 0..program.params {
    let param = func.new_scratch();
    func.add_mov(param, arg_reg(index));
    values.push(param);
  }
  values.extend(program.constants.iter().map(|c| func.add_imm(*c)));

  for step in &program.steps {
    let value = match step {
      Step::Alu(op, lhs, rhs) => {
        let lhs = values[lhs % values.len()];
        let rhs = values[rhs % values.len()];
        func.add_alu(OPS[*op], lhs, rhs)
      },
      Step::Call(arg) => {
        func.add_mov(arg_reg(0), values[arg % values.len()]);
        func.add_call("/g(Int)", 1, true).unwrap()
      },
    };
    values.push(value);
  }
  if let Some(last) = values.last() {
    func.add_mov(REG_RESULT, *last);
  }
  func.add(Instr::Ret { returns: true });
  func
}

/// R8 after running straight-line code entered with `ARGS`.
fn run(func: &Function) -> i32 {
  let mut regs: HashMap<RegId, i32> = HashMap::new();
  for (index, value) in ARGS.iter().enumerate() {
    regs.insert(arg_reg(index), *value);
  }
  let read = |regs: &HashMap<RegId, i32>, reg: RegId| if reg == REG_ZERO { 0 } else { regs.get(&reg).copied().unwrap_or(0) };

  for instr in &func.code {
    match instr {
      Instr::MovImm { dest, value } => {
        regs.insert(*dest, *value);
      },
      Instr::Mov { dest, src } => {
        let value = read(&regs, *src);
        regs.insert(*dest, value);
      },
      Instr::Alu { op, dest, lhs, rhs } => {
        let value = op.evaluate(read(&regs, *lhs), read(&regs, *rhs)).unwrap();
        regs.insert(*dest, value);
      },
      Instr::AluImm { op, dest, lhs, rhs } => {
        let value = op.evaluate(read(&regs, *lhs), *rhs).unwrap();
        regs.insert(*dest, value);
      },
      Instr::Call { .. } => {
        let result = callee(read(&regs, arg_reg(0)));
        for index in 0..7 {
          regs.insert(arg_reg(index), CLOBBER);
        }
        regs.insert(REG_RESULT, result);
      },
      Instr::Start | Instr::Ret { .. } | Instr::Nop => {},
      other => panic!("unexpected {:?}", other),
    }
  }
  read(&regs, REG_RESULT)
}

proptest! {
    #[test]
    fn peephole_reaches_a_fixpoint(program in program()) {
        let config = FplConfig::silent();
        let mut func = build(&program);
        peephole_fixpoint(&config, &mut func).unwrap();

        let before = func.code.clone();
        rebuild_index(&mut func).unwrap();
        prop_assert!(!peephole(&config, &mut func));
        prop_assert_eq!(func.code, before);
    }

    #[test]
    fn optimising_preserves_the_result(program in program()) {
        let expected = run(&build(&program));

        let mut func = build(&program);
        peephole_fixpoint(&FplConfig::silent(), &mut func).unwrap();
        prop_assert_eq!(run(&func), expected);
    }

    #[test]
    fn allocation_preserves_the_result(program in program()) {
        let expected = run(&build(&program));

        let mut func = build(&program);
        run_function(&FplConfig::silent(), &mut func).unwrap();
        prop_assert_eq!(run(&func), expected);
        let all_regs_in_range = func.code.iter().all(|instr| {
            instr.def().into_iter().chain(instr.uses()).all(|reg| reg.index() < 32)
        });
        prop_assert!(all_regs_in_range);
    }

    #[test]
    fn interfering_registers_get_different_machine_registers(program in program()) {
        let config = FplConfig::silent();
        let mut func = build(&program);
        peephole_fixpoint(&config, &mut func).unwrap();
        let live = LiveMap::build(&func);
        let virtual_code = func.code.clone();
        allocate_registers(&config, &mut func, &live).unwrap();

        // A definition never lands on a register holding another live value.
        for (index, (before, after)) in virtual_code.iter().zip(&func.code).enumerate() {
            let (Some(def_before), Some(def_after)) = (before.def(), after.def()) else {
                continue;
            };
            let src = match before {
                Instr::Mov { src, .. } => Some(*src),
                _ => None,
            };
            for other in live.live_after(index) {
                if *other == def_before || Some(*other) == src {
                    continue;
                }
                let other_after = virtual_code
                    .iter()
                    .zip(&func.code)
                    .find_map(|(b, a)| (b.def() == Some(*other)).then(|| a.def()).flatten())
                    .unwrap_or(*other);
                prop_assert_ne!(other_after, def_after);
            }
        }
    }
}
