//! Аргументы командной строки

use std::net::Ipv4Addr;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tlc_snmp::Command as ControllerCommand;

#[derive(Parser, Debug, Clone)]
#[command(name = "tlc-snmp")]
#[command(version)]
#[command(about = "Опрос и управление светофорными контроллерами по SNMP", long_about = None)]
pub struct Args {
    /// Файл конфигурации с инвентарём хостов
    #[arg(short, long, env = "TLC_SNMP_CONFIG", default_value = "./config/hosts.yaml")]
    pub config: PathBuf,

    /// Подробные логи (debug)
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,

    /// Компактный JSON в одну строку
    #[arg(long, default_value_t = false)]
    pub compact: bool,

    #[command(subcommand)]
    pub command: Action,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Action {
    /// Опросить состояние всех хостов из конфигурации
    States,
    /// Вызвать фазу (0 возвращает локальное управление)
    SetStage {
        #[arg(long)]
        ip: Ipv4Addr,
        #[arg(long)]
        stage: u32,
    },
    /// Жёлтое мигание
    Flash(SwitchArgs),
    /// Отключение светофора
    Dark(SwitchArgs),
    /// Кругом красный
    AllRed(SwitchArgs),
    /// Перезапуск программы
    Restart {
        #[arg(long)]
        ip: Ipv4Addr,
    },
}

#[derive(clap::Args, Debug, Clone)]
pub struct SwitchArgs {
    #[arg(long)]
    pub ip: Ipv4Addr,
    #[command(flatten)]
    pub state: SwitchState,
}

#[derive(clap::Args, Debug, Clone)]
#[group(required = true, multiple = false)]
pub struct SwitchState {
    #[arg(long)]
    pub on: bool,
    #[arg(long)]
    pub off: bool,
}

impl Action {
    /// Хост и команда для управляющих подкоманд
    pub fn controller_command(&self) -> Option<(Ipv4Addr, ControllerCommand)> {
        match self {
            Action::States => None,
            Action::SetStage { ip, stage } => Some((*ip, ControllerCommand::Stage(*stage))),
            Action::Flash(args) => Some((args.ip, ControllerCommand::Flash(args.state.on))),
            Action::Dark(args) => Some((args.ip, ControllerCommand::Dark(args.state.on))),
            Action::AllRed(args) => Some((args.ip, ControllerCommand::AllRed(args.state.on))),
            Action::Restart { ip } => Some((*ip, ControllerCommand::RestartProgram)),
        }
    }
}
