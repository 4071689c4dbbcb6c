//! The opcode execution semantics, kept in their own file for cohesion with
//! [`crate::opcode`]'s decoding and smaller file sizes.
use crate::definitions::{cpu, display};
use crate::error::Chip8Error;
use crate::opcode::{AluOp, KeyOp, Misc, MiscOp, Opcodes, ProgramCounterStep, Zero};

use super::VirtualMachine;

impl VirtualMachine {
    pub(super) fn execute(&mut self, opcode: Opcodes) -> Result<(), Chip8Error> {
        let step = match opcode {
            Opcodes::Zero(op) => self.op_zero(op)?,
            Opcodes::Jp(op) => ProgramCounterStep::Jump(op.nnn),
            Opcodes::Call(op) => self.op_call(op.nnn)?,
            Opcodes::SeByte(op) => ProgramCounterStep::cond(self.registers[op.x] == op.nn),
            Opcodes::SneByte(op) => ProgramCounterStep::cond(self.registers[op.x] != op.nn),
            Opcodes::SeReg(op) => {
                ProgramCounterStep::cond(self.registers[op.x] == self.registers[op.y])
            }
            Opcodes::LdByte(op) => {
                self.registers[op.x] = op.nn;
                ProgramCounterStep::Stay
            }
            Opcodes::AddByte(op) => {
                self.registers[op.x] = self.registers[op.x].wrapping_add(op.nn);
                ProgramCounterStep::Stay
            }
            Opcodes::Alu(op) => self.op_alu(op.op, op.x, op.y),
            Opcodes::SneReg(op) => {
                ProgramCounterStep::cond(self.registers[op.x] != self.registers[op.y])
            }
            Opcodes::LdI(op) => {
                self.index_register = op.nnn;
                ProgramCounterStep::Stay
            }
            Opcodes::JpV0(op) => {
                ProgramCounterStep::Jump(op.nnn.wrapping_add(self.registers[0] as u16))
            }
            Opcodes::Rnd(op) => {
                let mut byte = [0u8; 1];
                self.rng.fill_bytes(&mut byte);
                self.registers[op.x] = op.nn & byte[0];
                ProgramCounterStep::Stay
            }
            Opcodes::Drw(op) => self.op_draw(op.x, op.y, op.n)?,
            Opcodes::Skp(op) => {
                let key = self.registers[op.x] & 0xF;
                let pressed = self.keyboard.is_pressed(key);
                ProgramCounterStep::cond(match op.op {
                    KeyOp::Pressed => pressed,
                    KeyOp::NotPressed => !pressed,
                })
            }
            Opcodes::Misc(op) => self.op_misc(op)?,
        };

        self.program_counter = step.apply(self.program_counter);
        Ok(())
    }

    fn op_zero(&mut self, opcode: Zero) -> Result<ProgramCounterStep, Chip8Error> {
        Ok(match opcode {
            Zero::Nop => ProgramCounterStep::Stay,
            Zero::Clear => {
                for row in self.screen.iter_mut() {
                    row.fill(false);
                }
                ProgramCounterStep::Stay
            }
            Zero::Return => {
                let address = self.pop_stack()?;
                ProgramCounterStep::Jump(address)
            }
        })
    }

    fn op_call(&mut self, nnn: u16) -> Result<ProgramCounterStep, Chip8Error> {
        // `program_counter` already points past this instruction (fetch
        // advanced it), which is exactly the return address RET needs.
        self.push_stack(self.program_counter)?;
        Ok(ProgramCounterStep::Jump(nnn))
    }

    fn op_alu(&mut self, op: AluOp, x: usize, y: usize) -> ProgramCounterStep {
        match op {
            AluOp::Ld => self.registers[x] = self.registers[y],
            AluOp::Or => self.registers[x] |= self.registers[y],
            AluOp::And => self.registers[x] &= self.registers[y],
            AluOp::Xor => self.registers[x] ^= self.registers[y],
            AluOp::Add => {
                let sum = self.registers[x] as u16 + self.registers[y] as u16;
                self.registers[x] = sum as u8;
                self.registers[cpu::register::FLAG] = (sum > 0xFF) as u8;
            }
            AluOp::Sub => {
                let (vx, vy) = (self.registers[x], self.registers[y]);
                self.registers[x] = vx.wrapping_sub(vy);
                self.registers[cpu::register::FLAG] = (vx >= vy) as u8;
            }
            AluOp::Shr => {
                let vy = self.registers[y];
                self.registers[cpu::register::FLAG] = vy & 1;
                self.registers[x] = vy >> 1;
            }
            AluOp::Subn => {
                let (vx, vy) = (self.registers[x], self.registers[y]);
                self.registers[x] = vy.wrapping_sub(vx);
                self.registers[cpu::register::FLAG] = (vy >= vx) as u8;
            }
            AluOp::Shl => {
                let vy = self.registers[y];
                self.registers[cpu::register::FLAG] = (vy >> 7) & 1;
                self.registers[x] = vy << 1;
            }
        }
        ProgramCounterStep::Stay
    }

    fn op_draw(&mut self, x: usize, y: usize, n: usize) -> Result<ProgramCounterStep, Chip8Error> {
        let index = self.index_register as usize;
        self.check_range(index, n)?;

        let base_x = self.registers[x] as usize % display::WIDTH;
        let base_y = self.registers[y] as usize % display::HEIGHT;

        self.registers[cpu::register::FLAG] = 0;

        for row in 0..n {
            let sprite_byte = self.memory[index + row];
            let screen_y = (base_y + row) % display::HEIGHT;
            for col in 0..8 {
                let bit_set = (sprite_byte & (0x80 >> col)) != 0;
                if !bit_set {
                    continue;
                }
                let screen_x = (base_x + col) % display::WIDTH;
                let pixel = &mut self.screen[screen_y][screen_x];
                if *pixel {
                    self.registers[cpu::register::FLAG] = 1;
                }
                *pixel = !*pixel;
            }
        }

        Ok(ProgramCounterStep::Stay)
    }

    fn op_misc(&mut self, opcode: Misc) -> Result<ProgramCounterStep, Chip8Error> {
        let x = opcode.x;
        Ok(match opcode.op {
            MiscOp::GetDelay => {
                self.registers[x] = self.delay_timer;
                ProgramCounterStep::Stay
            }
            MiscOp::WaitKey => match self.keyboard.lowest_pressed() {
                Some(key) => {
                    self.registers[x] = key;
                    ProgramCounterStep::Stay
                }
                None => ProgramCounterStep::Retry,
            },
            MiscOp::SetDelay => {
                self.delay_timer = self.registers[x];
                ProgramCounterStep::Stay
            }
            MiscOp::SetSound => {
                self.sound_timer = self.registers[x];
                ProgramCounterStep::Stay
            }
            MiscOp::AddToI => {
                self.index_register = self.index_register.wrapping_add(self.registers[x] as u16);
                ProgramCounterStep::Stay
            }
            MiscOp::FontChar => {
                let digit = (self.registers[x] & 0xF) as u16;
                self.index_register =
                    display::fontset::LOCATION + digit * display::fontset::GLYPH_SIZE;
                ProgramCounterStep::Stay
            }
            MiscOp::Bcd => {
                let index = self.index_register as usize;
                self.check_range(index, 3)?;
                let value = self.registers[x];
                self.memory[index] = value / 100;
                self.memory[index + 1] = (value / 10) % 10;
                self.memory[index + 2] = value % 10;
                ProgramCounterStep::Stay
            }
            MiscOp::StoreRegs => {
                let index = self.index_register as usize;
                self.check_range(index, x + 1)?;
                self.memory[index..=index + x].copy_from_slice(&self.registers[..=x]);
                self.index_register = self.index_register.wrapping_add(x as u16 + 1);
                ProgramCounterStep::Stay
            }
            MiscOp::LoadRegs => {
                let index = self.index_register as usize;
                self.check_range(index, x + 1)?;
                self.registers[..=x].copy_from_slice(&self.memory[index..=index + x]);
                self.index_register = self.index_register.wrapping_add(x as u16 + 1);
                ProgramCounterStep::Stay
            }
        })
    }
}
